/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{SocketAddr, UdpSocket};
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;

enum MetricsSinkIo {
    #[cfg(test)]
    Buf(BufMetricsSink),
    Udp(UdpMetricsSink),
}

impl MetricsSinkIo {
    fn send_msg(&self, buf: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(test)]
            MetricsSinkIo::Buf(b) => b.send_msg(buf),
            MetricsSinkIo::Udp(s) => s.send_msg(buf),
        }
    }
}

pub(crate) struct MetricsSink {
    cache_size: usize,
    buf: Vec<u8>,
    io: MetricsSinkIo,
}

impl MetricsSink {
    #[cfg(test)]
    pub(crate) fn buf_with_capacity(buf: Arc<Mutex<Vec<u8>>>, cache_size: usize) -> Self {
        MetricsSink {
            cache_size,
            buf: Vec::with_capacity(cache_size),
            io: MetricsSinkIo::Buf(BufMetricsSink { buf }),
        }
    }

    pub(crate) fn udp_with_capacity(
        addr: SocketAddr,
        socket: UdpSocket,
        cache_size: usize,
    ) -> Self {
        MetricsSink {
            cache_size,
            buf: Vec::with_capacity(cache_size),
            io: MetricsSinkIo::Udp(UdpMetricsSink { addr, socket }),
        }
    }

    pub(super) fn emit<F>(&mut self, format: F) -> io::Result<()>
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let mut msg = Vec::with_capacity(64);
        format(&mut msg);

        if !self.buf.is_empty() {
            if self.buf.len() + 1 + msg.len() > self.cache_size {
                self.flush_buf()?;
            } else {
                self.buf.push(b'\n');
            }
        }
        self.buf.extend_from_slice(&msg);
        Ok(())
    }

    pub(super) fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        self.io.send_msg(&self.buf)?;
        self.buf.clear();
        Ok(())
    }
}

struct UdpMetricsSink {
    addr: SocketAddr,
    socket: UdpSocket,
}

impl UdpMetricsSink {
    fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        self.socket.send_to(msg, self.addr)
    }
}

#[cfg(test)]
struct BufMetricsSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl BufMetricsSink {
    fn send_msg(&self, msg: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap();
        buf.extend_from_slice(msg);
        Ok(msg.len())
    }
}
