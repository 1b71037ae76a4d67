use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language of the messages the CLI prints to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn success(self) -> &'static str {
        match self {
            Locale::En => "Conversion succeeded!",
            Locale::Zh => "转换成功！",
        }
    }

    pub fn error(self, msg: &str) -> String {
        match self {
            Locale::En => format!("Error: {msg}"),
            Locale::Zh => format!("错误: {msg}"),
        }
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    /// Unknown tags fall back to English.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        if tag == "zh" || tag.starts_with("zh-") || tag.starts_with("zh_") {
            Ok(Locale::Zh)
        } else {
            Ok(Locale::En)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_tags() {
        assert_eq!("zh-CN".parse::<Locale>().unwrap(), Locale::Zh);
        assert_eq!("zh_TW".parse::<Locale>().unwrap(), Locale::Zh);
        assert_eq!("fr".parse::<Locale>().unwrap(), Locale::En);
    }

    #[test]
    fn messages() {
        assert_eq!(Locale::Zh.success(), "转换成功！");
        assert_eq!(Locale::En.error("boom"), "Error: boom");
    }
}
