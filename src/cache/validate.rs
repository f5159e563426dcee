//! # 参数校验
//!
//! 缓存引擎在调用任何后端之前执行的前置检查

use crate::ensure_argument;
use crate::error::Result;

/// 键中禁止出现的保留字符
pub const RESERVED_KEY_CHARACTERS: &[char] = &['{', '}', '(', ')', '/', '\\', '@'];

/// 检查缓存键是否合法
pub fn assert_key(key: &str) -> Result<()> {
    ensure_argument!(!key.is_empty(), "缓存键不能为空字符串");

    if let Some(reserved) = key.chars().find(|c| RESERVED_KEY_CHARACTERS.contains(c)) {
        return Err(crate::argument_error!(
            "缓存键 \"{}\" 包含保留字符 '{}'",
            key,
            reserved
        ));
    }

    Ok(())
}

/// 检查一组缓存键是否全部合法
pub fn assert_keys<'a, I>(keys: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter().try_for_each(assert_key)
}

/// 检查表名/集合名等会拼入语句的标识符
pub fn assert_identifier(field: &str, value: &str) -> Result<()> {
    ensure_argument!(!value.is_empty(), "配置项 {} 不能为空", field);
    ensure_argument!(
        value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        "配置项 {} 只能包含字母、数字和下划线，但提供了 \"{}\"",
        field,
        value
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo")]
    #[case("user:42")]
    #[case("a.b-c_d")]
    fn test_valid_keys(#[case] key: &str) {
        assert!(assert_key(key).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("a/b")]
    #[case("a\\b")]
    #[case("{x}")]
    #[case("f(x)")]
    #[case("me@host")]
    fn test_invalid_keys(#[case] key: &str) {
        assert!(assert_key(key).unwrap_err().is_argument());
    }

    #[test]
    fn test_assert_keys_stops_at_first_invalid() {
        assert!(assert_keys(["a", "b"]).is_ok());
        let err = assert_keys(["a", "", "c/d"]).unwrap_err();
        assert!(err.to_string().contains("不能为空"));
    }

    #[test]
    fn test_identifier() {
        assert!(assert_identifier("table", "cache_data").is_ok());
        assert!(assert_identifier("table", "").unwrap_err().is_argument());
        assert!(
            assert_identifier("table", "cache; DROP TABLE x")
                .unwrap_err()
                .is_argument()
        );
    }
}
