// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! QR 码格式校验 (策略接口)

use regex::Regex;

use crate::error::Result;

pub trait FormatValidator: Send + Sync {
    /// true 表示接受该 QR 码
    fn check(&self, qr_code: &str) -> bool;
}

/// 全部接受
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl FormatValidator for AcceptAll {
    fn check(&self, _qr_code: &str) -> bool {
        true
    }
}

/// 正则完整匹配
#[derive(Debug, Clone)]
pub struct RegexFormat {
    regex: Regex,
}

impl RegexFormat {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl FormatValidator for RegexFormat {
    fn check(&self, qr_code: &str) -> bool {
        self.regex.is_match(qr_code)
    }
}

impl<F> FormatValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, qr_code: &str) -> bool {
        self(qr_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAll.check(""));
        assert!(AcceptAll.check("anything"));
    }

    #[test]
    fn test_regex_full_match() {
        let format = RegexFormat::new(r"[A-Z]{3}\d{3}").unwrap();
        assert!(format.check("ABC123"));
        assert!(!format.check("xABC123"));
        assert!(!format.check("ABC1234"));
        assert!(!format.check("AB"));
    }

    #[test]
    fn test_regex_alternation_is_anchored() {
        let format = RegexFormat::new("foo|bar").unwrap();
        assert!(format.check("bar"));
        assert!(!format.check("foobar"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            RegexFormat::new("(unclosed"),
            Err(crate::Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_closure() {
        let six = |s: &str| s.len() == 6;
        assert!(six.check("ABC123"));
        assert!(!six.check("AB"));
    }

    #[test]
    fn test_validators_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AcceptAll>();
        assert_send_sync::<RegexFormat>();
        assert_send_sync::<Box<dyn FormatValidator>>();
        assert_send_sync::<crate::QrCodeFinder>();
    }
}
