//! Legacy Thrift RPC session.
//!
//! Speaks the framed binary protocol over one TCP connection per session and
//! implements only the three calls cql-exec needs.

use super::{Column, Compression, CqlResult, CqlResultType, CqlRow, RpcSession, SessionFactory};
use crate::error::{CqlExecError, Result};
use std::net::{Shutdown, TcpStream};
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::transport::{
    ReadHalf, TFramedReadTransport, TFramedWriteTransport, TIoChannel, TTcpChannel, WriteHalf,
};
use thrift::{ProtocolError, ProtocolErrorKind};
use tracing::debug;

/// Default port of the legacy RPC interface.
pub const DEFAULT_RPC_PORT: u16 = 9160;

type InputProtocol = TBinaryInputProtocol<TFramedReadTransport<ReadHalf<TTcpChannel>>>;
type OutputProtocol = TBinaryOutputProtocol<TFramedWriteTransport<WriteHalf<TTcpChannel>>>;

/// Declared exceptions per call, keyed by result field id.
const EXECUTE_CQL_QUERY_EXCEPTIONS: &[(i16, &str)] = &[
    (1, "InvalidRequestException"),
    (2, "UnavailableException"),
    (3, "TimedOutException"),
    (4, "SchemaDisagreementException"),
];
const DESCRIBE_KEYSPACE_EXCEPTIONS: &[(i16, &str)] =
    &[(1, "NotFoundException"), (2, "InvalidRequestException")];
const SET_KEYSPACE_EXCEPTIONS: &[(i16, &str)] = &[(1, "InvalidRequestException")];

/// Opens Thrift sessions against a fixed address and port.
#[derive(Debug, Clone)]
pub struct ThriftSessionFactory {
    address: String,
    port: u16,
}

impl ThriftSessionFactory {
    /// Creates a factory for the given node.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl SessionFactory for ThriftSessionFactory {
    fn open(&self) -> Result<Box<dyn RpcSession>> {
        Ok(Box::new(ThriftSession::connect(&self.address, self.port)?))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// One framed Thrift connection.
pub struct ThriftSession {
    stream: TcpStream,
    i_prot: InputProtocol,
    o_prot: OutputProtocol,
    sequence_number: i32,
}

impl ThriftSession {
    /// Connects to `address:port`.
    pub fn connect(address: &str, port: u16) -> Result<Self> {
        let endpoint = format!("{address}:{port}");
        debug!("Opening RPC session to {}", endpoint);

        let stream = TcpStream::connect((address, port)).map_err(|e| {
            CqlExecError::connection(format!("Cannot connect to {endpoint}: {e}"))
        })?;
        let control = stream.try_clone().map_err(|e| {
            CqlExecError::connection(format!("Cannot set up session to {endpoint}: {e}"))
        })?;
        let (read_half, write_half) = TTcpChannel::with_stream(stream).split().map_err(|e| {
            CqlExecError::connection(format!("Cannot set up session to {endpoint}: {e}"))
        })?;

        Ok(Self {
            stream: control,
            i_prot: TBinaryInputProtocol::new(TFramedReadTransport::new(read_half), false),
            o_prot: TBinaryOutputProtocol::new(TFramedWriteTransport::new(write_half), true),
            sequence_number: 0,
        })
    }

    fn send_call(
        &mut self,
        method: &str,
        write_args: impl FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
    ) -> thrift::Result<i32> {
        self.sequence_number += 1;
        let o_prot = &mut self.o_prot;
        o_prot.write_message_begin(&TMessageIdentifier::new(
            method,
            TMessageType::Call,
            self.sequence_number,
        ))?;
        o_prot.write_struct_begin(&TStructIdentifier::new(format!("{method}_args")))?;
        write_args(&mut *o_prot)?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()?;
        o_prot.write_message_end()?;
        o_prot.flush()?;
        Ok(self.sequence_number)
    }

    /// Sends one call and reads its reply.
    ///
    /// `read_success` decodes field 0 of the result struct. Declared
    /// exceptions become `Rpc` errors carrying the exception name.
    fn call<T>(
        &mut self,
        method: &str,
        exceptions: &[(i16, &str)],
        write_args: impl FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
        read_success: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<T>,
    ) -> Result<Option<T>> {
        let sequence_number = self
            .send_call(method, write_args)
            .map_err(|e| transport_error(method, e))?;
        self.read_reply(method, sequence_number, exceptions, read_success)
            .map_err(|e| match e {
                ReplyError::Transport(e) => transport_error(method, e),
                ReplyError::Remote(msg) => CqlExecError::rpc(msg),
            })
    }

    fn read_reply<T>(
        &mut self,
        method: &str,
        sequence_number: i32,
        exceptions: &[(i16, &str)],
        read_success: impl FnOnce(&mut dyn TInputProtocol) -> thrift::Result<T>,
    ) -> std::result::Result<Option<T>, ReplyError> {
        let i_prot: &mut dyn TInputProtocol = &mut self.i_prot;
        let header = i_prot.read_message_begin()?;

        if header.message_type == TMessageType::Exception {
            let remote = thrift::Error::read_application_error_from_in_protocol(i_prot)?;
            i_prot.read_message_end()?;
            return Err(ReplyError::Remote(format!(
                "{method} failed on the server: {}",
                remote.message
            )));
        }
        if header.message_type != TMessageType::Reply || header.name != method {
            return Err(ReplyError::Transport(invalid_data(format!(
                "unexpected {:?} message '{}' in reply to {method}",
                header.message_type, header.name
            ))));
        }
        if header.sequence_number != sequence_number {
            return Err(ReplyError::Transport(invalid_data(format!(
                "reply sequence number {} does not match request {sequence_number}",
                header.sequence_number
            ))));
        }

        let mut read_success = Some(read_success);
        let mut success = None;
        let mut exception = None;

        i_prot.read_struct_begin()?;
        loop {
            let field = i_prot.read_field_begin()?;
            if field.field_type == TType::Stop {
                break;
            }
            match (field.id, field.field_type) {
                (Some(0), TType::Struct) => match read_success.take() {
                    Some(read) => success = Some(read(&mut *i_prot)?),
                    None => i_prot.skip(TType::Struct)?,
                },
                (Some(id), TType::Struct) => {
                    let name = exceptions
                        .iter()
                        .find(|(field_id, _)| *field_id == id)
                        .map_or("UnknownException", |(_, name)| *name);
                    exception = Some(read_exception(i_prot, name)?);
                }
                (_, other) => i_prot.skip(other)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        i_prot.read_message_end()?;

        match exception {
            Some(msg) => Err(ReplyError::Remote(msg)),
            None => Ok(success),
        }
    }
}

impl RpcSession for ThriftSession {
    fn describe_keyspace(&mut self, name: &str) -> Result<()> {
        let definition = self.call(
            "describe_keyspace",
            DESCRIBE_KEYSPACE_EXCEPTIONS,
            |o| write_string_field(o, "keyspace", 1, name),
            |i| i.skip(TType::Struct),
        )?;
        definition.ok_or_else(|| {
            CqlExecError::rpc(format!("describe_keyspace returned no definition for '{name}'"))
        })
    }

    fn set_keyspace(&mut self, name: &str) -> Result<()> {
        self.call(
            "set_keyspace",
            SET_KEYSPACE_EXCEPTIONS,
            |o| write_string_field(o, "keyspace", 1, name),
            |i| i.skip(TType::Struct),
        )?;
        Ok(())
    }

    fn execute_cql_query(
        &mut self,
        query: &[u8],
        compression: Compression,
    ) -> Result<CqlResult> {
        let result = self.call(
            "execute_cql_query",
            EXECUTE_CQL_QUERY_EXCEPTIONS,
            |o| {
                o.write_field_begin(&TFieldIdentifier::new("query", TType::String, 1))?;
                o.write_bytes(query)?;
                o.write_field_end()?;
                o.write_field_begin(&TFieldIdentifier::new("compression", TType::I32, 2))?;
                o.write_i32(compression.as_i32())?;
                o.write_field_end()
            },
            read_cql_result,
        )?;
        result.ok_or_else(|| CqlExecError::rpc("execute_cql_query returned no result"))
    }

    fn close(&mut self) -> Result<()> {
        debug!("Closing RPC session");
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(CqlExecError::rpc(format!("Failed to close session: {e}"))),
        }
    }
}

enum ReplyError {
    Transport(thrift::Error),
    Remote(String),
}

impl From<thrift::Error> for ReplyError {
    fn from(e: thrift::Error) -> Self {
        Self::Transport(e)
    }
}

fn transport_error(method: &str, e: thrift::Error) -> CqlExecError {
    CqlExecError::rpc(format!("{method} failed: {e}"))
}

fn invalid_data(message: String) -> thrift::Error {
    thrift::Error::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidData, message))
}

fn write_string_field(
    o: &mut dyn TOutputProtocol,
    name: &str,
    id: i16,
    value: &str,
) -> thrift::Result<()> {
    o.write_field_begin(&TFieldIdentifier::new(name, TType::String, id))?;
    o.write_string(value)?;
    o.write_field_end()
}

/// Reads a declared exception struct; field 1, when a string, is the reason.
fn read_exception(i: &mut dyn TInputProtocol, name: &str) -> thrift::Result<String> {
    let mut why = None;
    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => why = Some(i.read_string()?),
            (_, other) => i.skip(other)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(match why {
        Some(why) => format!("{name}: {why}"),
        None => name.to_string(),
    })
}

fn read_cql_result(i: &mut dyn TInputProtocol) -> thrift::Result<CqlResult> {
    let mut result_type = None;
    let mut rows = Vec::new();
    let mut num = None;

    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::I32) => {
                let value = i.read_i32()?;
                result_type = Some(CqlResultType::from_i32(value).ok_or_else(|| {
                    invalid_data(format!("unknown CqlResultType {value}"))
                })?);
            }
            (Some(2), TType::List) => {
                let list = i.read_list_begin()?;
                for _ in 0..list.size {
                    rows.push(read_cql_row(i)?);
                }
                i.read_list_end()?;
            }
            (Some(3), TType::I32) => num = Some(i.read_i32()?),
            (_, other) => i.skip(other)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;

    let result_type =
        result_type.ok_or_else(|| invalid_data("CqlResult is missing its type".to_string()))?;
    Ok(CqlResult {
        result_type,
        rows,
        num,
    })
}

fn read_cql_row(i: &mut dyn TInputProtocol) -> thrift::Result<CqlRow> {
    let mut row = CqlRow::default();

    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => row.key = i.read_bytes()?,
            (Some(2), TType::List) => {
                let list = i.read_list_begin()?;
                for _ in 0..list.size {
                    row.columns.push(read_column(i)?);
                }
                i.read_list_end()?;
            }
            (_, other) => i.skip(other)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(row)
}

fn read_column(i: &mut dyn TInputProtocol) -> thrift::Result<Column> {
    let mut column = Column::default();

    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => column.name = i.read_bytes()?,
            (Some(2), TType::String) => column.value = i.read_bytes()?,
            (Some(3), TType::I64) => column.timestamp = Some(i.read_i64()?),
            (_, other) => i.skip(other)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(column)
}
