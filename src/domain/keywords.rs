//! 关键词规则表
//!
//! 脚本解析、音效整形、音色分配共用的有序规则：
//! 规则按顺序匹配，第一条命中的规则决定结果

/// 关键词规则
///
/// `keywords` 中任一关键词命中即产出 `result`
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T: 'static> {
    pub keywords: &'static [&'static str],
    pub result: T,
}

/// 检查文本是否包含关键词（词首边界匹配）
///
/// 关键词必须出现在词的开头，词尾允许延伸，
/// 因此 `realize` 可以命中 `realized`，而 `beat` 不会命中 `heartbeat`。
/// 调用方负责传入小写文本和小写关键词。
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(keyword) {
        let abs = start + pos;
        let at_boundary = text[..abs]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        if at_boundary {
            return true;
        }
        start = abs + keyword.len();
        if start >= text.len() {
            break;
        }
    }
    false
}

/// 检查文本是否包含任一关键词
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_keyword(text, k))
}

/// 按顺序匹配规则表，返回第一条命中规则的结果
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .find(|rule| contains_any(&lower, rule.keywords))
        .map(|rule| rule.result)
}

/// 折叠空白字符为单个空格
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
