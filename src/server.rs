use std::{
    io::{BufReader, BufWriter, Write},
    net::{TcpListener, TcpStream, ToSocketAddrs},
};

use log::{debug, error};

use crate::{dispatcher::Dispatcher, thread_pool::ThreadPool, transport::Request, Result};

pub struct KvServer {
    dispatcher: Dispatcher,
}

impl KvServer {
    pub fn new(dispatcher: Dispatcher) -> KvServer {
        KvServer { dispatcher }
    }

    /// Binds `addr` and serves connections until the process is stopped.
    pub fn start<A: ToSocketAddrs, P: ThreadPool>(self, addr: A, pool: P) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve(listener, pool)
    }

    /// Serves connections from an already bound listener, one pool job per
    /// connection.
    pub fn serve<P: ThreadPool>(self, listener: TcpListener, pool: P) -> Result<()> {
        for stream in listener.incoming() {
            match stream {
                Ok(s) => {
                    let dispatcher = self.dispatcher.clone();
                    pool.spawn(move || {
                        if let Err(e) = handle_client_req(dispatcher, s) {
                            error!("failed to serve client, err: {}", e);
                        }
                    });
                }
                Err(e) => error!("failed to accept connection, err: {}", e),
            }
        }

        Ok(())
    }
}

// Answers every request on the connection, in order, until the client hangs up.
fn handle_client_req(dispatcher: Dispatcher, s: TcpStream) -> Result<()> {
    let peer = s.peer_addr()?;
    debug!("handling connection from {}", peer);

    let reader = BufReader::new(&s);
    let mut writer = BufWriter::new(&s);
    let requests = serde_json::Deserializer::from_reader(reader).into_iter::<Request>();

    for req in requests {
        let req = req?;
        debug!("{}: {:?}", peer, req);

        let resp = dispatcher.handle(req);
        serde_json::to_writer(&mut writer, &resp)?;
        writer.flush()?;
        debug!("{}: {:?}", peer, resp);
    }

    debug!("{} disconnected", peer);
    Ok(())
}
