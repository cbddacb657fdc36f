//! RecordCodec - [`UrlNode`] のワイヤ形式
//!
//! レコードは JSON オブジェクトとして保存する: `{"base_url": "...", "params": {...}}`
//!
//! # デコード
//! - 成功か失敗のどちらか（不完全な node を黙って返さない）
//! - 未知のフィールド、欠けたフィールド、型違い、空の `base_url` はエラー

use crate::domain::UrlNode;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("record encode: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("record decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("record decode: empty base_url")]
    EmptyBaseUrl,
}

pub struct RecordCodec;

impl RecordCodec {
    pub fn encode(node: &UrlNode) -> Result<String, CodecError> {
        serde_json::to_string(node).map_err(CodecError::Encode)
    }

    pub fn decode(raw: &str) -> Result<UrlNode, CodecError> {
        let node: UrlNode = serde_json::from_str(raw).map_err(CodecError::Decode)?;
        if node.base_url().trim().is_empty() {
            return Err(CodecError::EmptyBaseUrl);
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn encoded_record_decodes_to_same_node() {
        let node = UrlNode::new("https://example.com/search")
            .with_param("q", "rust")
            .with_param("page", "3");
        let raw = RecordCodec::encode(&node).unwrap();
        assert_eq!(RecordCodec::decode(&raw).unwrap(), node);
    }

    #[test]
    fn wire_form_is_plain_json() {
        let node = UrlNode::new("https://example.com/a").with_param("id", "1");
        let raw = RecordCodec::encode(&node).unwrap();
        assert_eq!(raw, r#"{"base_url":"https://example.com/a","params":{"id":"1"}}"#);
    }

    #[rstest]
    #[case::not_json("not json at all")]
    #[case::truncated(r#"{"base_url":"https://example.com/a","params":{"#)]
    #[case::missing_params(r#"{"base_url":"https://example.com/a"}"#)]
    #[case::unknown_field(r#"{"base_url":"https://example.com/a","params":{},"depth":2}"#)]
    #[case::wrong_type(r#"{"base_url":"https://example.com/a","params":{"id":1}}"#)]
    #[case::array(r#"["https://example.com/a"]"#)]
    fn malformed_records_fail(#[case] raw: &str) {
        assert!(matches!(RecordCodec::decode(raw), Err(CodecError::Decode(_))));
    }

    #[test]
    fn empty_base_url_fails() {
        let raw = r#"{"base_url":"  ","params":{}}"#;
        assert!(matches!(RecordCodec::decode(raw), Err(CodecError::EmptyBaseUrl)));
    }
}
