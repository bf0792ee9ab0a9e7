use serde_json::Value;

/// Compact JSON with object keys sorted at every level.
///
/// Signatures are computed over this form so they do not depend on map
/// ordering in whichever serde_json build ends up linked.
pub fn stringify_deterministic(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_value(&obj[key], out);
            }
            out.push('}');
        }
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorts_nested_keys() {
        let value = json!({
            "nonce": 3,
            "actions": [{ "type": "sequence", "data": "aGk=", "rollup_id": "ab" }],
        });
        assert_eq!(
            stringify_deterministic(&value),
            r#"{"actions":[{"data":"aGk=","rollup_id":"ab","type":"sequence"}],"nonce":3}"#
        );
    }

    #[test]
    fn test_scalars_and_escapes() {
        assert_eq!(stringify_deterministic(&json!(null)), "null");
        assert_eq!(stringify_deterministic(&json!("a\"b")), r#""a\"b""#);
        assert_eq!(stringify_deterministic(&json!([1, true, {}])), "[1,true,{}]");
    }
}
