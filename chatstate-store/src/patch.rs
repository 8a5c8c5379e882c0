//! JSON patch application (RFC 6902) over `serde_json::Value`.
//!
//! Application is transactional: operations run against a working copy and
//! the document is replaced only if every operation succeeds.

use chatstate_core::{ChatStateError, PatchError, PatchOperation, Result};
use serde_json::Value;

/// Apply `operations` to `document`, all or nothing.
///
/// On failure `document` is untouched and the error names the index of the
/// first failing operation.
pub fn apply_patch(document: &mut Value, operations: &[PatchOperation]) -> Result<()> {
    if operations.is_empty() {
        return Ok(());
    }
    let mut working = document.clone();
    for (index, operation) in operations.iter().enumerate() {
        apply_operation(&mut working, operation)
            .map_err(|source| ChatStateError::Patch { index, source })?;
    }
    *document = working;
    Ok(())
}

fn apply_operation(doc: &mut Value, operation: &PatchOperation) -> std::result::Result<(), PatchError> {
    match operation {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(drop),
        PatchOperation::Replace { path, value } => {
            let target = pointer_mut(doc, path)?;
            *target = value.clone();
            Ok(())
        }
        PatchOperation::Move { from, path } => {
            if from == path {
                return pointer_mut(doc, from).map(drop);
            }
            if path.starts_with(&format!("{from}/")) {
                return Err(PatchError::MoveIntoChild {
                    from: from.clone(),
                    path: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = pointer_mut(doc, from)?.clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            if *pointer_mut(doc, path)? == *value {
                Ok(())
            } else {
                Err(PatchError::TestFailed(path.clone()))
            }
        }
    }
}

/// Split a JSON pointer into unescaped reference tokens.
fn parse_pointer(path: &str) -> std::result::Result<Vec<String>, PatchError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(PatchError::InvalidPointer(path.to_string()));
    };
    rest.split('/').map(|token| unescape(token, path)).collect()
}

fn unescape(token: &str, path: &str) -> std::result::Result<String, PatchError> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(PatchError::InvalidPointer(path.to_string())),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Array index token: decimal without leading zeros.
fn parse_index(token: &str, path: &str) -> std::result::Result<usize, PatchError> {
    let valid = token == "0"
        || (!token.is_empty() && !token.starts_with('0') && token.bytes().all(|b| b.is_ascii_digit()));
    if !valid {
        return Err(PatchError::IndexOutOfBounds(path.to_string()));
    }
    token
        .parse()
        .map_err(|_| PatchError::IndexOutOfBounds(path.to_string()))
}

fn step<'a>(
    value: &'a mut Value,
    token: &str,
    path: &str,
) -> std::result::Result<&'a mut Value, PatchError> {
    match value {
        Value::Object(map) => map
            .get_mut(token)
            .ok_or_else(|| PatchError::PathNotFound(path.to_string())),
        Value::Array(items) => {
            let i = parse_index(token, path)?;
            items
                .get_mut(i)
                .ok_or_else(|| PatchError::IndexOutOfBounds(path.to_string()))
        }
        _ => Err(PatchError::NotAContainer(path.to_string())),
    }
}

fn resolve<'a>(
    doc: &'a mut Value,
    tokens: &[String],
    path: &str,
) -> std::result::Result<&'a mut Value, PatchError> {
    tokens
        .iter()
        .try_fold(doc, |value, token| step(value, token, path))
}

fn pointer_mut<'a>(doc: &'a mut Value, path: &str) -> std::result::Result<&'a mut Value, PatchError> {
    let tokens = parse_pointer(path)?;
    resolve(doc, &tokens, path)
}

fn add(doc: &mut Value, path: &str, value: Value) -> std::result::Result<(), PatchError> {
    let mut tokens = parse_pointer(path)?;
    let Some(last) = tokens.pop() else {
        *doc = value;
        return Ok(());
    };
    match resolve(doc, &tokens, path)? {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            let i = parse_index(&last, path)?;
            if i > items.len() {
                return Err(PatchError::IndexOutOfBounds(path.to_string()));
            }
            items.insert(i, value);
            Ok(())
        }
        _ => Err(PatchError::NotAContainer(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &str) -> std::result::Result<Value, PatchError> {
    let mut tokens = parse_pointer(path)?;
    let Some(last) = tokens.pop() else {
        return Err(PatchError::InvalidPointer(path.to_string()));
    };
    match resolve(doc, &tokens, path)? {
        Value::Object(map) => map
            .remove(&last)
            .ok_or_else(|| PatchError::PathNotFound(path.to_string())),
        Value::Array(items) => {
            let i = parse_index(&last, path)?;
            if i >= items.len() {
                return Err(PatchError::IndexOutOfBounds(path.to_string()));
            }
            Ok(items.remove(i))
        }
        _ => Err(PatchError::NotAContainer(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "revision": 1,
            "messages": [{"id": "m1", "content": "a"}, {"id": "m2", "content": "b"}],
            "metadata": {"a/b": 1, "m~n": 2}
        })
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut d = doc();
        apply_patch(&mut d, &[]).unwrap();
        assert_eq!(d, doc());
    }

    #[test]
    fn test_add_replace_remove() {
        let mut d = doc();
        apply_patch(
            &mut d,
            &[
                PatchOperation::replace("/revision", json!(2)),
                PatchOperation::add("/messages/-", json!({"id": "m3"})),
                PatchOperation::remove("/messages/0"),
                PatchOperation::add("/messages/0/status", json!("completed")),
            ],
        )
        .unwrap();
        assert_eq!(d["revision"], json!(2));
        assert_eq!(d["messages"][0], json!({"id": "m2", "content": "b", "status": "completed"}));
        assert_eq!(d["messages"][1], json!({"id": "m3"}));
    }

    #[test]
    fn test_add_inserts_into_array() {
        let mut d = doc();
        apply_patch(&mut d, &[PatchOperation::add("/messages/1", json!({"id": "mx"}))]).unwrap();
        let ids: Vec<_> = d["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["m1", "mx", "m2"]);
    }

    #[test]
    fn test_escaped_tokens() {
        let mut d = doc();
        apply_patch(
            &mut d,
            &[
                PatchOperation::replace("/metadata/a~1b", json!(10)),
                PatchOperation::remove("/metadata/m~0n"),
            ],
        )
        .unwrap();
        assert_eq!(d["metadata"], json!({"a/b": 10}));
    }

    #[test]
    fn test_move_copy_test() {
        let mut d = doc();
        apply_patch(
            &mut d,
            &[
                PatchOperation::Test { path: "/messages/0/id".into(), value: json!("m1") },
                PatchOperation::Copy { from: "/messages/0".into(), path: "/messages/-".into() },
                PatchOperation::Move { from: "/metadata".into(), path: "/settings".into() },
            ],
        )
        .unwrap();
        assert_eq!(d["messages"].as_array().unwrap().len(), 3);
        assert_eq!(d["messages"][2]["id"], json!("m1"));
        assert!(d.get("metadata").is_none());
        assert_eq!(d["settings"]["a/b"], json!(1));
    }

    #[test]
    fn test_move_into_child_rejected() {
        let mut d = doc();
        let err = apply_patch(
            &mut d,
            &[PatchOperation::Move { from: "/metadata".into(), path: "/metadata/inner".into() }],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ChatStateError::Patch { index: 0, source: PatchError::MoveIntoChild { .. } }
        ));
    }

    #[test]
    fn test_root_replacement() {
        let mut d = doc();
        apply_patch(&mut d, &[PatchOperation::replace("", json!({"revision": 9}))]).unwrap();
        assert_eq!(d, json!({"revision": 9}));
    }

    #[rstest]
    #[case(PatchOperation::replace("/missing", json!(1)), PatchError::PathNotFound("/missing".into()))]
    #[case(PatchOperation::remove("/messages/5"), PatchError::IndexOutOfBounds("/messages/5".into()))]
    #[case(PatchOperation::add("/messages/7", json!(1)), PatchError::IndexOutOfBounds("/messages/7".into()))]
    #[case(PatchOperation::add("/messages/01", json!(1)), PatchError::IndexOutOfBounds("/messages/01".into()))]
    #[case(PatchOperation::add("/revision/x", json!(1)), PatchError::NotAContainer("/revision/x".into()))]
    #[case(PatchOperation::add("revision", json!(1)), PatchError::InvalidPointer("revision".into()))]
    #[case(PatchOperation::remove("/metadata/bad~2"), PatchError::InvalidPointer("/metadata/bad~2".into()))]
    #[case(PatchOperation::remove(""), PatchError::InvalidPointer("".into()))]
    #[case(PatchOperation::Test { path: "/revision".into(), value: json!(5) }, PatchError::TestFailed("/revision".into()))]
    fn test_unresolvable_operations(#[case] op: PatchOperation, #[case] expected: PatchError) {
        let mut d = doc();
        let err = apply_patch(&mut d, &[op]).unwrap_err();
        match err {
            ChatStateError::Patch { index, source } => {
                assert_eq!(index, 0);
                assert_eq!(source, expected);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(d, doc());
    }

    #[test]
    fn test_failure_midway_commits_nothing() {
        let mut d = doc();
        let err = apply_patch(
            &mut d,
            &[
                PatchOperation::replace("/revision", json!(2)),
                PatchOperation::remove("/messages/0"),
                PatchOperation::replace("/messages/9/content", json!("x")),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ChatStateError::Patch { index: 2, .. }));
        assert_eq!(d, doc());
    }
}
