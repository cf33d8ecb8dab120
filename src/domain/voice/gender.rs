//! 说话人性别推断
//!
//! 顺序：称谓关键词 → 常见名字表 → 名字后缀启发

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

const MALE_TITLES: &[&str] = &[
    "MR", "SIR", "MAN", "BOY", "KING", "PRINCE", "FATHER", "DAD", "PAPA", "BROTHER", "BHAI",
    "UNCLE", "SON", "HUSBAND", "GRANDFATHER", "GRANDPA", "DADA", "NANA", "GUY", "LORD",
    "MALE", "WAITER", "POLICEMAN",
];

const FEMALE_TITLES: &[&str] = &[
    "MRS", "MS", "MISS", "MADAM", "MAAM", "LADY", "WOMAN", "GIRL", "QUEEN", "PRINCESS",
    "MOTHER", "MOM", "MUM", "MAA", "AMMA", "SISTER", "DIDI", "AUNT", "AUNTY", "AUNTIE",
    "DAUGHTER", "WIFE", "GRANDMOTHER", "GRANDMA", "DADI", "NANI", "FEMALE", "NURSE",
    "WAITRESS",
];

const MALE_NAMES: &[&str] = &[
    "ARJUN", "VIKRAM", "RAHUL", "RAJ", "ROHAN", "AMIT", "KARAN", "DEV", "SANJAY", "RAVI",
    "ANIL", "SURESH", "RAMESH", "VIJAY", "AJAY", "SUNIL", "MANOJ", "IMRAN", "KABIR", "ADITYA",
    "NIKHIL", "ARYAN", "KUNAL", "HARSH", "SAMEER", "FARHAN", "JOHN", "DAVID", "MICHAEL",
    "JAMES", "ROBERT", "WILLIAM", "THOMAS", "DANIEL", "MARK", "PETER", "PAUL", "GEORGE",
    "HENRY", "JACK", "SAM", "ALEX", "LUCAS", "MARCUS", "VICTOR", "OMAR", "ALI",
];

const FEMALE_NAMES: &[&str] = &[
    "PRIYA", "ANANYA", "NEHA", "POOJA", "KAVYA", "MEERA", "ANJALI", "DIVYA", "SNEHA", "RIYA",
    "ISHA", "NISHA", "SUNITA", "ANITA", "KIRAN", "RADHA", "LAKSHMI", "SITA", "AISHA",
    "FATIMA", "ZOYA", "TARA", "SARA", "MAYA", "LEELA", "ANU", "SARAH", "EMMA", "OLIVIA",
    "EMILY", "MARY", "ELIZABETH", "JESSICA", "LAURA", "ANNA", "KATE", "RACHEL", "CLAIRE",
    "SOPHIE", "GRACE", "ELENA", "NINA", "LILY", "RUTH", "HELEN",
];

/// 以这些后缀结尾的未知名字按女性处理（常见南亚/欧洲女性名结构）
const FEMALE_SUFFIXES: &[&str] = &["A", "I", "EE", "ELLE", "ETTE", "INE"];

/// 名字中的词（按非字母数字切分，大写）
pub fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .collect()
}

/// 是否为名字表或称谓表中的词
pub fn is_known_name(token: &str) -> bool {
    let upper = token.to_uppercase();
    [MALE_NAMES, FEMALE_NAMES, MALE_TITLES, FEMALE_TITLES]
        .iter()
        .any(|list| list.contains(&upper.as_str()))
}

/// 推断说话人性别
pub fn detect_gender(name: &str) -> Gender {
    let tokens = name_tokens(name);
    if tokens.is_empty() {
        return Gender::Unknown;
    }

    if tokens.iter().any(|t| FEMALE_TITLES.contains(&t.as_str())) {
        return Gender::Female;
    }
    if tokens.iter().any(|t| MALE_TITLES.contains(&t.as_str())) {
        return Gender::Male;
    }

    for token in &tokens {
        if MALE_NAMES.contains(&token.as_str()) {
            return Gender::Male;
        }
        if FEMALE_NAMES.contains(&token.as_str()) {
            return Gender::Female;
        }
    }

    // 仅对首个词做后缀启发，头衔类短词（如 DR）不参与
    let first = &tokens[0];
    if first.chars().count() >= 3 && first.chars().all(|c| c.is_alphabetic()) {
        if FEMALE_SUFFIXES.iter().any(|s| first.ends_with(s)) {
            return Gender::Female;
        }
        return Gender::Male;
    }

    Gender::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(detect_gender("ARJUN"), Gender::Male);
        assert_eq!(detect_gender("Priya"), Gender::Female);
        assert_eq!(detect_gender("VIKRAM MALHOTRA"), Gender::Male);
    }

    #[test]
    fn test_titles_take_precedence() {
        assert_eq!(detect_gender("MRS. KAPOOR"), Gender::Female);
        assert_eq!(detect_gender("UNCLE RAVI"), Gender::Male);
        assert_eq!(detect_gender("NURSE"), Gender::Female);
    }

    #[test]
    fn test_suffix_heuristic() {
        assert_eq!(detect_gender("SHALINI"), Gender::Female);
        assert_eq!(detect_gender("DEEPIKA"), Gender::Female);
        assert_eq!(detect_gender("BHASKAR"), Gender::Male);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(detect_gender(""), Gender::Unknown);
        assert_eq!(detect_gender("DR"), Gender::Unknown);
        assert_eq!(detect_gender("X-7"), Gender::Unknown);
    }
}
