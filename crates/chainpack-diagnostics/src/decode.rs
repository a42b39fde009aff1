//! Revert payload decoding.
//!
//! Dispatch on the 4-byte selector that opens every revert payload: the two
//! built-in solc encodings (`Panic(uint256)`, `Error(string)`) decode without
//! any contract knowledge; anything else is a custom error that needs an ABI
//! to name it.

use alloy_dyn_abi::{DynSolType, DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;

/// `keccak("Panic(uint256)")[..4]`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// `keccak("Error(string)")[..4]`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

fn panic_reason(code: u64) -> &'static str {
    match code {
        0x00 => "generic/unknown error",
        0x01 => "assertion failed",
        0x11 => "unchecked underflow/overflow",
        0x12 => "division by zero",
        0x21 => "invalid number to enum conversion",
        0x22 => "access to incorrect storage byte array",
        0x31 => "pop() empty array",
        0x32 => "out of bounds array access",
        0x41 => "out of memory",
        0x51 => "invalid internal function",
        _ => "unknown",
    }
}

/// Decodes the two solc built-in revert encodings, e.g.
/// `Panic("division by zero")` or `Error("insufficient balance")`.
pub fn decode_builtin(data: &[u8]) -> Option<String> {
    let selector = data.get(..4)?;
    let payload = &data[4..];

    if selector == PANIC_SELECTOR {
        let DynSolValue::Uint(code, _) = DynSolType::Uint(256).abi_decode(payload).ok()? else {
            return None;
        };

        return Some(format!("Panic(\"{}\")", panic_reason(code.saturating_to::<u64>())));
    }

    if selector == ERROR_SELECTOR {
        let DynSolValue::String(reason) = DynSolType::String.abi_decode(payload).ok()? else {
            return None;
        };

        return Some(format!("Error(\"{reason}\")"));
    }

    None
}

/// Tries the payload as a custom error of `abi`. First error whose selector
/// matches and whose arguments decode wins.
pub fn decode_custom(data: &[u8], abi: &JsonAbi) -> Option<String> {
    let selector = data.get(..4)?;
    let payload = &data[4..];

    for error in abi.errors() {
        if error.selector().as_slice() != selector {
            continue;
        }

        let Ok(values) = error.abi_decode_input(payload) else {
            continue;
        };

        let arguments = values.iter().map(format_value).collect::<Vec<_>>().join(", ");
        return Some(format!("{}({})", error.name, arguments));
    }

    None
}

/// Raw hex fallback when nothing decodes.
pub fn format_raw(data: &[u8]) -> String {
    Bytes::copy_from_slice(data).to_string()
}

fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::String(text) => format!("\"{text}\""),
        DynSolValue::Bool(flag) => flag.to_string(),
        DynSolValue::Uint(number, _) => number.to_string(),
        DynSolValue::Int(number, _) => number.to_string(),
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Bytes(bytes) => Bytes::copy_from_slice(bytes).to_string(),
        DynSolValue::FixedBytes(word, size) => Bytes::copy_from_slice(&word[..*size]).to_string(),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            format!(
                "[{}]",
                values.iter().map(format_value).collect::<Vec<_>>().join(", ")
            )
        },
        other => format!("{other:?}"),
    }
}
