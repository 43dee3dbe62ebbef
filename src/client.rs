use std::{
    io::{BufReader, BufWriter, Write},
    net::{TcpStream, ToSocketAddrs},
};

use serde::Deserialize;
use serde_json::de::{Deserializer, IoRead};

use crate::{
    transport::{Request, Response},
    KvError, Result,
};

/// A connection to a `kvd` server. Requests on one client are answered in
/// the order they were sent.
pub struct KvClient {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl KvClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<KvClient> {
        let stream = TcpStream::connect(addr).map_err(|e| KvError::TCP(e.to_string()))?;
        let reader = stream.try_clone()?;
        Ok(KvClient {
            reader: Deserializer::from_reader(BufReader::new(reader)),
            writer: BufWriter::new(stream),
        })
    }

    fn send(&mut self, req: &Request) -> Result<Response> {
        serde_json::to_writer(&mut self.writer, req)?;
        self.writer.flush()?;
        Ok(Response::deserialize(&mut self.reader)?)
    }

    pub fn put(&mut self, key: String, value: String) -> Result<()> {
        match self.send(&Request::Put { key, value })? {
            Response::Ok(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Returns `KvError::KeyNotFound` when the server has no such key.
    pub fn get(&mut self, key: String) -> Result<String> {
        match self.send(&Request::Get { key })? {
            Response::Ok(Some(value)) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// Returns `KvError::KeyNotFound` when the server has no such key.
    pub fn delete(&mut self, key: String) -> Result<()> {
        match self.send(&Request::Del { key })? {
            Response::Ok(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Every entry on the server, in key order.
    pub fn walk(&mut self) -> Result<Vec<(String, String)>> {
        match self.send(&Request::Walk)? {
            Response::Entries(entries) => Ok(entries),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(resp: Response) -> KvError {
    match resp {
        Response::NotFound => KvError::KeyNotFound,
        Response::Err(msg) => KvError::Server(msg),
        other => KvError::Parser(format!("unexpected response {:?}", other)),
    }
}
