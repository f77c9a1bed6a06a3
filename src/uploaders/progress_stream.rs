use std::pin::Pin;
use std::task::{Context, Poll};
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use tokio::sync::mpsc;
use crate::core::TransferProgress;

pin_project! {
    /// 包装请求体，每发出一个数据块就上报累计字节数
    pub struct ProgressStream<S> {
        #[pin]
        inner: S,
        bytes_sent: u64,
        bytes_total: u64,
        progress_tx: mpsc::UnboundedSender<TransferProgress>,
    }
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, bytes_total: u64, progress_tx: mpsc::UnboundedSender<TransferProgress>) -> Self {
        Self {
            inner,
            bytes_sent: 0,
            bytes_total,
            progress_tx,
        }
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>>
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if !chunk.is_empty() {
                    *this.bytes_sent += chunk.len() as u64;
                    // 接收端已关闭时丢弃进度即可
                    let _ = this.progress_tx.send(TransferProgress {
                        bytes_sent: *this.bytes_sent,
                        bytes_total: *this.bytes_total,
                    });
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}
