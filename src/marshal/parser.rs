//! Parser for canonical type names such as `CompositeType(UTF8Type,LongType)`.

use super::MarshalType;
use crate::error::{CqlExecError, Result};

const MARSHAL_PACKAGE: &str = "org.apache.cassandra.db.marshal.";

pub(super) fn parse(input: &str) -> Result<MarshalType> {
    let mut parser = TypeParser { input, pos: 0 };
    let ty = parser.parse_type()?;
    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(CqlExecError::config(format!(
            "unexpected '{}' at position {} in type '{input}'",
            &input[parser.pos..],
            parser.pos
        )));
    }
    Ok(ty)
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn parse_type(&mut self) -> Result<MarshalType> {
        self.skip_whitespace();
        let start = self.pos;
        let name = self.read_identifier();
        if name.is_empty() {
            return Err(CqlExecError::config(format!(
                "expected a type name at position {start} in '{}'",
                self.input
            )));
        }
        let name = name.strip_prefix(MARSHAL_PACKAGE).unwrap_or(name);

        self.skip_whitespace();
        let params = if self.peek() == Some('(') {
            self.pos += 1;
            self.parse_params()?
        } else {
            Vec::new()
        };

        build(name, params)
    }

    fn parse_params(&mut self) -> Result<Vec<MarshalType>> {
        let mut params = Vec::new();
        loop {
            params.push(self.parse_type()?);
            self.skip_whitespace();
            match self.next_char() {
                Some(',') => continue,
                Some(')') => return Ok(params),
                _ => {
                    return Err(CqlExecError::config(format!(
                        "unbalanced parentheses in type '{}'",
                        self.input
                    )))
                }
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '$') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

fn build(name: &str, mut params: Vec<MarshalType>) -> Result<MarshalType> {
    let simple = match name {
        "BytesType" => Some(MarshalType::Bytes),
        "UTF8Type" => Some(MarshalType::Utf8),
        "AsciiType" => Some(MarshalType::Ascii),
        "LongType" => Some(MarshalType::Long),
        "CounterColumnType" => Some(MarshalType::Counter),
        "Int32Type" => Some(MarshalType::Int32),
        "IntegerType" => Some(MarshalType::Integer),
        "DecimalType" => Some(MarshalType::Decimal),
        "BooleanType" => Some(MarshalType::Boolean),
        "DoubleType" => Some(MarshalType::Double),
        "FloatType" => Some(MarshalType::Float),
        "DateType" => Some(MarshalType::Date),
        "UUIDType" => Some(MarshalType::Uuid),
        "TimeUUIDType" => Some(MarshalType::TimeUuid),
        "LexicalUUIDType" => Some(MarshalType::LexicalUuid),
        "InetAddressType" => Some(MarshalType::InetAddress),
        _ => None,
    };

    if let Some(ty) = simple {
        if !params.is_empty() {
            return Err(CqlExecError::config(format!(
                "{name} does not take parameters"
            )));
        }
        return Ok(ty);
    }

    match name {
        "ReversedType" => {
            if params.len() != 1 {
                return Err(CqlExecError::config(format!(
                    "ReversedType takes exactly one parameter, got {}",
                    params.len()
                )));
            }
            let inner = params.remove(0);
            Ok(MarshalType::Reversed(Box::new(inner)))
        }
        "CompositeType" => {
            if params.is_empty() {
                return Err(CqlExecError::config(
                    "CompositeType needs at least one component type",
                ));
            }
            Ok(MarshalType::Composite(params))
        }
        other => Err(CqlExecError::config(format!("unknown type '{other}'"))),
    }
}
