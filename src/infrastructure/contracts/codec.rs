//! Conversion between ABI tokens and JSON values.
//!
//! Call results are flattened over the finite set of `Token` variants so the
//! API layer only ever ships JSON-safe data: sequences become arrays, byte
//! payloads become lowercase `0x` hex strings, integers wider than the JSON
//! number range become decimal strings. The reverse direction binds a named
//! parameter mapping to a function's declared inputs and coerces each value
//! to the matching ABI kind.

use ethers::abi::{Function, ParamType, Token};
use ethers::types::{Address, I256, U256};
use ethers::utils::to_checksum;
use serde_json::{Map, Value};

use crate::infrastructure::contracts::types::ContractError;

// ============ TOKEN -> JSON ============

/// Flatten a single decoded token into a JSON value.
pub fn flatten_token(token: &Token) -> Value {
    match token {
        Token::Address(address) => Value::String(to_checksum(address, None)),
        Token::Bytes(bytes) | Token::FixedBytes(bytes) => {
            Value::String(format!("0x{}", hex::encode(bytes)))
        }
        Token::Uint(value) => {
            if *value <= U256::from(u64::MAX) {
                Value::from(value.as_u64())
            } else {
                Value::String(value.to_string())
            }
        }
        Token::Int(raw) => {
            let value = I256::from_raw(*raw);
            if value >= I256::from(i64::MIN) && value <= I256::from(i64::MAX) {
                Value::from(value.as_i64())
            } else {
                Value::String(value.to_string())
            }
        }
        Token::Bool(value) => Value::Bool(*value),
        Token::String(value) => Value::String(value.clone()),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            Value::Array(items.iter().map(flatten_token).collect())
        }
    }
}

/// Flatten a function's decoded outputs.
///
/// A single return value is passed through directly; multiple named outputs
/// become a string-keyed mapping, unnamed ones an array.
pub fn flatten_outputs(function: &Function, tokens: &[Token]) -> Value {
    match tokens {
        [] => Value::Null,
        [single] => flatten_token(single),
        many => {
            let named = function
                .outputs
                .iter()
                .all(|output| !output.name.is_empty());
            if named && function.outputs.len() == many.len() {
                let entries = function
                    .outputs
                    .iter()
                    .zip(many)
                    .map(|(output, token)| (output.name.clone(), flatten_token(token)))
                    .collect::<Map<String, Value>>();
                Value::Object(entries)
            } else {
                Value::Array(many.iter().map(flatten_token).collect())
            }
        }
    }
}

// ============ JSON -> TOKEN ============

/// Bind a named parameter mapping to a function's inputs, in declared order.
pub fn bind_params(
    function: &Function,
    params: &Map<String, Value>,
) -> Result<Vec<Token>, ContractError> {
    for input in &function.inputs {
        if input.name.is_empty() {
            return Err(ContractError::AbiError(format!(
                "function {} has unnamed inputs and cannot take named parameters",
                function.name
            )));
        }
    }

    if let Some(extra) = params
        .keys()
        .find(|key| !function.inputs.iter().any(|input| input.name == **key))
    {
        return Err(ContractError::UnexpectedParameter {
            function: function.name.clone(),
            name: extra.clone(),
        });
    }

    function
        .inputs
        .iter()
        .map(|input| {
            let value = params
                .get(&input.name)
                .ok_or_else(|| ContractError::MissingParameter {
                    function: function.name.clone(),
                    name: input.name.clone(),
                })?;
            json_to_token(&input.kind, value, &input.name)
        })
        .collect()
}

/// Coerce one JSON value to an ABI token of the given kind.
///
/// Query-string parameters arrive as strings, so every scalar kind also
/// accepts its string spelling.
pub fn json_to_token(
    kind: &ParamType,
    value: &Value,
    name: &str,
) -> Result<Token, ContractError> {
    let invalid = |reason: String| ContractError::InvalidParameter {
        name: name.to_string(),
        reason,
    };

    match kind {
        ParamType::Address => {
            let raw = value
                .as_str()
                .ok_or_else(|| invalid("expected an address string".to_string()))?;
            let address = raw
                .parse::<Address>()
                .map_err(|_| invalid(format!("not a valid address: {}", raw)))?;
            Ok(Token::Address(address))
        }
        ParamType::Uint(_) => Ok(Token::Uint(parse_uint(value).map_err(invalid)?)),
        ParamType::Int(_) => {
            let parsed = match value {
                Value::Number(number) => number
                    .as_i64()
                    .map(I256::from)
                    .ok_or_else(|| "expected an integer".to_string()),
                Value::String(raw) => I256::from_dec_str(raw.trim())
                    .map_err(|_| format!("not a valid integer: {}", raw)),
                _ => Err("expected an integer".to_string()),
            }
            .map_err(invalid)?;
            Ok(Token::Int(parsed.into_raw()))
        }
        ParamType::Bool => match value {
            Value::Bool(flag) => Ok(Token::Bool(*flag)),
            Value::String(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Token::Bool(true)),
                "false" | "0" => Ok(Token::Bool(false)),
                other => Err(invalid(format!("not a valid boolean: {}", other))),
            },
            _ => Err(invalid("expected a boolean".to_string())),
        },
        ParamType::String => {
            let raw = value
                .as_str()
                .ok_or_else(|| invalid("expected a string".to_string()))?;
            Ok(Token::String(raw.to_string()))
        }
        ParamType::Bytes => Ok(Token::Bytes(parse_bytes(value).map_err(invalid)?)),
        ParamType::FixedBytes(size) => {
            let bytes = parse_bytes(value).map_err(invalid)?;
            if bytes.len() != *size {
                return Err(invalid(format!(
                    "expected {} bytes, got {}",
                    size,
                    bytes.len()
                )));
            }
            Ok(Token::FixedBytes(bytes))
        }
        ParamType::Array(inner) => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid("expected an array".to_string()))?;
            let tokens = items
                .iter()
                .map(|item| json_to_token(inner, item, name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::Array(tokens))
        }
        ParamType::FixedArray(inner, size) => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid("expected an array".to_string()))?;
            if items.len() != *size {
                return Err(invalid(format!(
                    "expected {} elements, got {}",
                    size,
                    items.len()
                )));
            }
            let tokens = items
                .iter()
                .map(|item| json_to_token(inner, item, name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::FixedArray(tokens))
        }
        ParamType::Tuple(kinds) => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid("expected a tuple as an array".to_string()))?;
            if items.len() != kinds.len() {
                return Err(invalid(format!(
                    "expected {} tuple fields, got {}",
                    kinds.len(),
                    items.len()
                )));
            }
            let tokens = kinds
                .iter()
                .zip(items)
                .map(|(inner, item)| json_to_token(inner, item, name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::Tuple(tokens))
        }
    }
}

fn parse_uint(value: &Value) -> Result<U256, String> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| "expected an unsigned integer".to_string()),
        Value::String(raw) => {
            let raw = raw.trim();
            if let Some(hex_digits) = raw.strip_prefix("0x") {
                U256::from_str_radix(hex_digits, 16)
                    .map_err(|_| format!("not a valid hex integer: {}", raw))
            } else {
                U256::from_dec_str(raw).map_err(|_| format!("not a valid integer: {}", raw))
            }
        }
        _ => Err("expected an unsigned integer".to_string()),
    }
}

fn parse_bytes(value: &Value) -> Result<Vec<u8>, String> {
    let raw = value
        .as_str()
        .ok_or_else(|| "expected a hex string".to_string())?;
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|_| format!("not a valid hex string: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::Param;

    fn function(inputs: Vec<(&str, ParamType)>, outputs: Vec<(&str, ParamType)>) -> Function {
        #[allow(deprecated)]
        Function {
            name: "example".to_string(),
            inputs: inputs
                .into_iter()
                .map(|(name, kind)| Param {
                    name: name.to_string(),
                    kind,
                    internal_type: None,
                })
                .collect(),
            outputs: outputs
                .into_iter()
                .map(|(name, kind)| Param {
                    name: name.to_string(),
                    kind,
                    internal_type: None,
                })
                .collect(),
            constant: None,
            state_mutability: ethers::abi::StateMutability::View,
        }
    }

    #[test]
    fn bytes_flatten_to_lowercase_hex_and_round_trip() {
        let bytes = vec![0xde, 0xad, 0xbe, 0xef];
        let flattened = flatten_token(&Token::Bytes(bytes.clone()));
        let text = flattened.as_str().unwrap();

        assert_eq!(text, "0xdeadbeef");
        assert_eq!(text.matches("0x").count(), 1);
        assert!(text[2..].chars().all(|c| !c.is_ascii_uppercase()));
        assert_eq!(hex::decode(&text[2..]).unwrap(), bytes);
    }

    #[test]
    fn small_uints_stay_numeric_and_large_ones_become_strings() {
        let small = flatten_token(&Token::Uint(U256::from(1_000_000_000_000_000_000u64)));
        assert_eq!(small, Value::from(1_000_000_000_000_000_000u64));

        let large = flatten_token(&Token::Uint(U256::from(u64::MAX) + U256::from(1u8)));
        assert_eq!(large, Value::String("18446744073709551616".to_string()));
    }

    #[test]
    fn negative_ints_flatten_to_signed_numbers() {
        let token = Token::Int(I256::from(-42i64).into_raw());
        assert_eq!(flatten_token(&token), Value::from(-42i64));
    }

    #[test]
    fn sequences_and_tuples_flatten_recursively() {
        let token = Token::Array(vec![
            Token::Tuple(vec![Token::Bool(true), Token::Uint(U256::from(7u8))]),
            Token::Tuple(vec![Token::Bool(false), Token::Uint(U256::from(9u8))]),
        ]);
        assert_eq!(
            flatten_token(&token),
            serde_json::json!([[true, 7], [false, 9]])
        );
    }

    #[test]
    fn multiple_named_outputs_become_a_mapping() {
        let f = function(
            vec![],
            vec![("owner", ParamType::Address), ("amount", ParamType::Uint(256))],
        );
        let tokens = vec![
            Token::Address(Address::zero()),
            Token::Uint(U256::from(5u8)),
        ];
        let value = flatten_outputs(&f, &tokens);
        let object = value.as_object().unwrap();
        assert!(object.contains_key("owner"));
        assert_eq!(object.get("amount"), Some(&Value::from(5u64)));
    }

    #[test]
    fn single_output_passes_through() {
        let f = function(vec![], vec![("", ParamType::Uint(256))]);
        let value = flatten_outputs(&f, &[Token::Uint(U256::from(3u8))]);
        assert_eq!(value, Value::from(3u64));
    }

    #[test]
    fn uint_params_accept_decimal_and_hex_strings() {
        let kind = ParamType::Uint(256);
        assert_eq!(
            json_to_token(&kind, &Value::String("123".to_string()), "amount").unwrap(),
            Token::Uint(U256::from(123u8))
        );
        assert_eq!(
            json_to_token(&kind, &Value::String("0xff".to_string()), "amount").unwrap(),
            Token::Uint(U256::from(255u8))
        );
        assert_eq!(
            json_to_token(&kind, &Value::from(9u64), "amount").unwrap(),
            Token::Uint(U256::from(9u8))
        );
    }

    #[test]
    fn bool_params_accept_string_spellings() {
        let kind = ParamType::Bool;
        assert_eq!(
            json_to_token(&kind, &Value::String("true".to_string()), "flag").unwrap(),
            Token::Bool(true)
        );
        assert_eq!(
            json_to_token(&kind, &Value::String("0".to_string()), "flag").unwrap(),
            Token::Bool(false)
        );
        assert!(json_to_token(&kind, &Value::String("yes".to_string()), "flag").is_err());
    }

    #[test]
    fn fixed_bytes_length_is_enforced() {
        let kind = ParamType::FixedBytes(32);
        let err = json_to_token(&kind, &Value::String("0x1234".to_string()), "hash")
            .expect_err("length mismatch must be rejected");
        assert!(matches!(err, ContractError::InvalidParameter { .. }));
    }

    #[test]
    fn bind_rejects_missing_and_unexpected_parameters() {
        let f = function(vec![("account", ParamType::Address)], vec![]);

        let missing = bind_params(&f, &Map::new()).expect_err("missing must fail");
        assert!(matches!(missing, ContractError::MissingParameter { .. }));

        let mut extra = Map::new();
        extra.insert(
            "account".to_string(),
            Value::String(format!("{:?}", Address::zero())),
        );
        extra.insert("bogus".to_string(), Value::from(1u64));
        let unexpected = bind_params(&f, &extra).expect_err("extra must fail");
        assert!(matches!(unexpected, ContractError::UnexpectedParameter { .. }));
    }

    #[test]
    fn bind_orders_tokens_by_declared_inputs() {
        let f = function(
            vec![("to", ParamType::Address), ("amount", ParamType::Uint(256))],
            vec![],
        );
        let mut params = Map::new();
        params.insert("amount".to_string(), Value::from(10u64));
        params.insert(
            "to".to_string(),
            Value::String(format!("{:?}", Address::zero())),
        );

        let tokens = bind_params(&f, &params).unwrap();
        assert_eq!(tokens[0], Token::Address(Address::zero()));
        assert_eq!(tokens[1], Token::Uint(U256::from(10u8)));
    }
}
