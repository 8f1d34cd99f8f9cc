//! Listening end of a named channel.

use courier_core::{ReceiverMessage, TransportError, TransportResult};
use futures::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, trace, warn};

use crate::channel::{self, Listener};
use crate::error::SerializerResult;
use crate::serializer;

/// Upper bound on one record, in bytes.
const MAX_RECORD_LENGTH: usize = 16 * 1024 * 1024;

/// Accepts sender connections on a named channel and yields one message per connection.
pub struct PipeReceiver {
    listener: Listener,
    pipe_name: String,
}

impl PipeReceiver {
    /// Starts listening on `pipe_name`.
    ///
    /// Must be called inside a tokio runtime. Fails if another receiver already owns the
    /// channel.
    pub fn bind(pipe_name: impl Into<String>) -> TransportResult<Self> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::NoRuntime(e.to_string()))?;

        let pipe_name = pipe_name.into();
        let path = channel::channel_path(&pipe_name);
        let listener = Listener::bind(path.clone())?;

        debug!(pipe = %pipe_name, path = %path.display(), "Pipe receiver listening");
        Ok(Self {
            listener,
            pipe_name,
        })
    }

    /// Returns the channel name.
    pub fn pipe_name(&self) -> &str {
        &self.pipe_name
    }

    /// Waits for the next message.
    ///
    /// Connections that close without writing a record are skipped. A record that cannot
    /// be decoded is returned as an error; the receiver stays usable afterwards.
    pub async fn recv(&mut self) -> TransportResult<ReceiverMessage> {
        loop {
            let stream = self.listener.accept().await?;
            let mut lines =
                FramedRead::new(stream, LinesCodec::new_with_max_length(MAX_RECORD_LENGTH));

            match lines.next().await {
                Some(Ok(record)) => {
                    trace!(pipe = %self.pipe_name, len = record.len(), "Record received");
                    return Ok(decode_record(&record)?);
                }
                Some(Err(e)) => {
                    warn!(pipe = %self.pipe_name, error = %e, "Failed to read record");
                    return Err(TransportError::Io(e.to_string()));
                }
                None => {
                    trace!(pipe = %self.pipe_name, "Connection closed without a record");
                }
            }
        }
    }
}

/// Decodes one record into the message its sender enqueued.
pub fn decode_record(record: &str) -> SerializerResult<ReceiverMessage> {
    serializer::deserialize(record)?.into_receiver_message()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::PipeSenderConfig;
    use crate::sender::PipeSender;
    use courier_core::{SenderMessage, names};
    use std::time::Duration;

    fn unique_name() -> String {
        format!("test-{}", uuid::Uuid::new_v4().simple())
    }

    async fn recv(receiver: &mut PipeReceiver) -> ReceiverMessage {
        tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .expect("receive timed out")
            .unwrap()
    }

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let name = unique_name();
        let mut receiver = PipeReceiver::bind(&name).unwrap();
        let sender = PipeSender::new(PipeSenderConfig::new(&name)).unwrap();

        sender
            .enqueue(&SenderMessage::new("A").with_header("seq", 1_i64))
            .unwrap();
        sender
            .enqueue(&SenderMessage::new("B").with_header("seq", 2_i64))
            .unwrap();

        let first = recv(&mut receiver).await;
        let second = recv(&mut receiver).await;
        assert_eq!(first.string_payload(), "A");
        assert_eq!(first.headers.get_str("seq").unwrap(), "1");
        assert_eq!(second.string_payload(), "B");

        let stats = sender.stats();
        sender.shutdown().await;
        assert_eq!(stats.delivered(), 2);
        assert_eq!(stats.dropped(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_keep_their_order() {
        const PRODUCERS: usize = 4;
        const FRAMES: usize = 50;

        let name = unique_name();
        let mut receiver = PipeReceiver::bind(&name).unwrap();
        let collector = tokio::spawn(async move {
            let mut received = Vec::with_capacity(PRODUCERS * FRAMES);
            for _ in 0..PRODUCERS * FRAMES {
                received.push(recv(&mut receiver).await);
            }
            received
        });

        let sender = PipeSender::new(PipeSenderConfig::new(&name)).unwrap();
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let handle = sender.handle();
                std::thread::spawn(move || {
                    for i in 0..FRAMES {
                        handle.enqueue(&SenderMessage::new(format!("{p}:{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let received = collector.await.unwrap();
        let stats = sender.stats();
        sender.shutdown().await;

        assert_eq!(stats.enqueued(), (PRODUCERS * FRAMES) as u64);
        assert_eq!(stats.delivered(), stats.enqueued());
        assert_eq!(stats.dropped(), 0);

        let mut next = [0usize; PRODUCERS];
        for message in &received {
            let payload = message.string_payload();
            let (p, i) = payload.split_once(':').unwrap();
            let (p, i): (usize, usize) = (p.parse().unwrap(), i.parse().unwrap());
            assert_eq!(i, next[p], "producer {p} out of order");
            next[p] += 1;
        }
        assert_eq!(next, [FRAMES; PRODUCERS]);
    }

    #[tokio::test]
    async fn test_compressed_binary_payload() {
        let name = unique_name();
        let mut receiver = PipeReceiver::bind(&name).unwrap();
        let config = PipeSenderConfig::new(&name).with_compression(true);

        PipeSender::scoped(config, |handle| async move {
            handle
                .enqueue(&SenderMessage::new(vec![0x00_u8, 0xff, 0x10]))
                .unwrap();
        })
        .await
        .unwrap();

        let message = recv(&mut receiver).await;
        assert!(message.is_binary());
        assert_eq!(message.binary_payload(), &[0x00, 0xff, 0x10]);
        assert!(!message.headers.contains(names::COMPRESSED_PAYLOAD));
        assert!(!message.headers.contains(names::MESSAGE_FORMAT));
        assert_eq!(
            message.headers.get_str(names::ORIGINATING_SYSTEM).unwrap(),
            "NamedPipe"
        );
    }

    #[tokio::test]
    async fn test_second_bind_is_rejected() {
        let name = unique_name();
        let _receiver = PipeReceiver::bind(&name).unwrap();
        assert!(PipeReceiver::bind(&name).is_err());
    }

    #[test]
    fn test_decode_record_rejects_garbage() {
        assert!(decode_record("not json").is_err());
    }
}
