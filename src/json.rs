use anyhow::{Result, anyhow};
use serde_json::{Map, Value};

pub fn read_list(json: &Value) -> Result<&Vec<Value>> {
    match json {
        Value::Null => Err(anyhow!("found null, where list expected")),
        Value::Bool(_) => Err(anyhow!("found a boolean, where list expected")),
        Value::Number(_) => Err(anyhow!("found a number, where list expected")),
        Value::String(_) => Err(anyhow!("found a literal, where list expected")),
        Value::Array(arr) => Ok(arr),
        Value::Object(_) => Err(anyhow!("found an object, where list expected")),
    }
}

pub fn read_object(json: &Value) -> Result<&Map<String, Value>> {
    match json {
        Value::Null => Err(anyhow!("found null, where object expected")),
        Value::Bool(_) => Err(anyhow!("found a boolean, where object expected")),
        Value::Number(_) => Err(anyhow!("found a number, where object expected")),
        Value::String(_) => Err(anyhow!("found a literal, where object expected")),
        Value::Array(_) => Err(anyhow!("found a list, where object expected")),
        Value::Object(obj) => Ok(obj),
    }
}

/**
 * Literals are returned as is; any other value is returned as its JSON text.
 */
pub fn read_as_string(json: &Value) -> String {
    match json {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{read_as_string, read_list, read_object};

    #[test]
    fn json_shapes() {
        let value = json!([{"a": 1}, "b"]);
        let list = read_list(&value).unwrap();
        assert_eq!(list.len(), 2);
        assert!(read_object(&list[0]).is_ok());
        assert!(read_object(&list[1]).is_err());
        assert!(read_list(&list[1]).is_err());
        assert_eq!(read_as_string(&list[1]), "b");
        assert_eq!(read_as_string(&list[0]["a"]), "1");
    }
}
