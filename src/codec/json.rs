//! serde_json entry points for documents of any nesting depth.
//!
//! Every chart level adds four levels of JSON, so serde_json's fixed
//! recursion limit is lifted and serde_stacker grows the stack on demand
//! while records are read or written.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

pub(crate) fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    T::deserialize(serde_stacker::Deserializer::new(value))
}

pub(crate) fn to_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    if pretty {
        let mut ser = serde_json::Serializer::pretty(&mut out);
        value.serialize(serde_stacker::Serializer::new(&mut ser))?;
    } else {
        let mut ser = serde_json::Serializer::new(&mut out);
        value.serialize(serde_stacker::Serializer::new(&mut ser))?;
    }
    String::from_utf8(out).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, serde_json::Error> {
    value.serialize(serde_stacker::Serializer::new(serde_json::value::Serializer))
}
