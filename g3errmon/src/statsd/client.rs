/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::time::Instant;

use itoa::Integer;
use log::warn;
use smallvec::SmallVec;

use super::MetricsSink;
use super::StatsdTagGroup;
use crate::types::NodeName;

enum MetricType {
    Count,
    Gauge,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Count => "c",
            MetricType::Gauge => "g",
        }
    }
}

pub(crate) struct StatsdClient {
    prefix: NodeName,
    sink: MetricsSink,
    tags: StatsdTagGroup,

    create_instant: Instant,
    last_error_report: u64,
}

impl StatsdClient {
    pub(super) fn new(prefix: NodeName, sink: MetricsSink) -> Self {
        StatsdClient {
            prefix,
            sink,
            tags: Default::default(),
            create_instant: Instant::now(),
            last_error_report: 0,
        }
    }

    pub(crate) fn with_tag<T: AsRef<str>>(mut self, key: &str, value: T) -> Self {
        self.tags.add_tag(key, value);
        self
    }

    pub(crate) fn count<'a, T: Integer>(
        &'a mut self,
        name: &'a str,
        value: T,
    ) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.metric_with_type(
            MetricType::Count,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    pub(crate) fn gauge<'a, T: Integer>(
        &'a mut self,
        name: &'a str,
        value: T,
    ) -> MetricFormatter<'a> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.metric_with_type(
            MetricType::Gauge,
            name,
            SmallVec::from_slice(value.as_bytes()),
        )
    }

    fn metric_with_type<'a>(
        &'a mut self,
        metric_type: MetricType,
        name: &'a str,
        value: SmallVec<[u8; 16]>,
    ) -> MetricFormatter<'a> {
        let has_tags = self.tags.len() > 0;
        MetricFormatter {
            client: self,
            metric_type,
            name,
            value,
            local_tags: StatsdTagGroup::default(),
            has_tags,
        }
    }

    pub(crate) fn flush_sink(&mut self) {
        if let Err(e) = self.sink.flush() {
            self.handle_emit_error(e);
        }
    }

    fn handle_emit_error(&mut self, e: io::Error) {
        let time_slice = self.create_instant.elapsed().as_secs().rotate_right(6); // every 64s
        if self.last_error_report != time_slice {
            warn!("sending metrics error: {e:?}");
            self.last_error_report = time_slice;
        }
    }
}

pub(crate) struct MetricFormatter<'a> {
    client: &'a mut StatsdClient,
    metric_type: MetricType,
    name: &'a str,
    value: SmallVec<[u8; 16]>,
    local_tags: StatsdTagGroup,

    has_tags: bool,
}

impl MetricFormatter<'_> {
    pub(crate) fn with_tag<T: AsRef<str>>(mut self, key: &str, value: T) -> Self {
        // has_tags is set when sending
        self.local_tags.add_tag(key, value);
        self
    }

    pub(crate) fn send(mut self) {
        if self.local_tags.len() > 0 {
            self.has_tags = true;
        }
        if let Err(e) = self.client.sink.emit(|buf| {
            if !self.client.prefix.is_empty() {
                buf.extend_from_slice(self.client.prefix.as_str().as_bytes());
                buf.push(b'.');
            }
            buf.extend_from_slice(self.name.as_bytes());
            buf.push(b':');
            buf.extend_from_slice(self.value.as_slice());
            buf.push(b'|');
            buf.extend_from_slice(self.metric_type.as_str().as_bytes());

            if !self.has_tags {
                return;
            }
            buf.extend_from_slice(b"|#");

            let mut append_tags = false;
            if self.client.tags.len() > 0 {
                buf.extend_from_slice(self.client.tags.as_bytes());
                append_tags = true;
            }

            if self.local_tags.len() > 0 {
                if append_tags {
                    buf.push(b',');
                }
                buf.extend_from_slice(self.local_tags.as_bytes());
            }
        }) {
            self.client.handle_emit_error(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::str::FromStr;
    use std::sync::Mutex;

    fn buf_client(buf: Arc<Mutex<Vec<u8>>>, cache_size: usize) -> StatsdClient {
        let sink = MetricsSink::buf_with_capacity(buf, cache_size);
        StatsdClient::new(NodeName::from_str("test").unwrap(), sink)
    }

    #[test]
    fn count_simple() {
        let buf = Arc::new(Mutex::new(Vec::default()));
        let mut client = buf_client(buf.clone(), 32);
        client.count("count", 20).send();
        client.flush_sink();

        let buf = buf.lock().unwrap();
        assert_eq!(buf.as_slice(), b"test.count:20|c");
    }

    #[test]
    fn gauge_simple() {
        let buf = Arc::new(Mutex::new(Vec::default()));
        let mut client = buf_client(buf.clone(), 32);
        client.gauge("gauge", 20).send();
        client.flush_sink();

        let buf = buf.lock().unwrap();
        assert_eq!(buf.as_slice(), b"test.gauge:20|g");
    }

    #[test]
    fn count_with_tags() {
        let buf = Arc::new(Mutex::new(Vec::default()));
        let mut client = buf_client(buf.clone(), 64).with_tag("tag1", "1234");
        client.count("count", 20).with_tag("tag2", "a").send();
        client.flush_sink();

        let buf = buf.lock().unwrap();
        assert_eq!(buf.as_slice(), b"test.count:20|c|#tag1:1234,tag2:a");
    }

    #[test]
    fn count_multiple_simple() {
        let buf = Arc::new(Mutex::new(Vec::default()));
        let mut client = buf_client(buf.clone(), 64);
        client.count("count", 20).send();
        client.count("count", 30).send();
        client.flush_sink();

        let buf = buf.lock().unwrap();
        assert_eq!(buf.as_slice(), b"test.count:20|c\ntest.count:30|c");
    }

    #[test]
    fn count_cache_overflow() {
        let buf = Arc::new(Mutex::new(Vec::default()));
        let mut client = buf_client(buf.clone(), 16);
        client.count("count", 20).send();
        client.count("count", 30).send();
        client.flush_sink();

        // the first metric is flushed before the second is buffered
        let buf = buf.lock().unwrap();
        assert_eq!(buf.as_slice(), b"test.count:20|ctest.count:30|c");
    }
}
