// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory link for tests.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use uuid::Uuid;

use super::link::{PairedDevice, SerialLink, SerialSocket};

/// Operation that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CreateSocket,
    Connect,
    Close,
    Stream,
    Write,
}

#[derive(Default)]
struct Inner {
    adapter_available: bool,
    devices: Vec<PairedDevice>,
    failing: HashSet<Step>,
    stalled: HashSet<Step>,
    discoveries: usize,
    closes: usize,
    sockets_for: Vec<String>,
    written: Vec<u8>,
}

impl Inner {
    fn check(&self, step: Step) -> io::Result<()> {
        if self.failing.contains(&step) {
            Err(io::Error::new(io::ErrorKind::Other, format!("{:?} failed", step)))
        } else {
            Ok(())
        }
    }
}

/// Scripted link shared between the test and the session.
#[derive(Clone, Default)]
pub struct MockLink {
    inner: Arc<Mutex<Inner>>,
}

impl MockLink {
    pub fn with_devices(names: &[&str]) -> Self {
        let link = Self::default();
        link.inner.lock().adapter_available = true;
        link.set_devices(names);
        link
    }

    pub fn set_devices(&self, names: &[&str]) {
        self.inner.lock().devices = names
            .iter()
            .enumerate()
            .map(|(i, name)| PairedDevice {
                address: format!("00:11:22:33:44:{:02X}", i),
                name: name.to_string(),
            })
            .collect();
    }

    pub fn set_adapter_available(&self, available: bool) {
        self.inner.lock().adapter_available = available;
    }

    pub fn fail(&self, step: Step) {
        self.inner.lock().failing.insert(step);
    }

    pub fn recover(&self, step: Step) {
        self.inner.lock().failing.remove(&step);
    }

    /// Make `step` never complete. Only `Connect` honours this.
    pub fn stall(&self, step: Step) {
        self.inner.lock().stalled.insert(step);
    }

    pub fn discoveries(&self) -> usize {
        self.inner.lock().discoveries
    }

    pub fn closes(&self) -> usize {
        self.inner.lock().closes
    }

    pub fn sockets_for(&self) -> Vec<String> {
        self.inner.lock().sockets_for.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().written.clone()
    }
}

impl SerialLink for MockLink {
    type Socket = MockSocket;

    async fn adapter_available(&self) -> bool {
        self.inner.lock().adapter_available
    }

    async fn paired_devices(&self) -> io::Result<Vec<PairedDevice>> {
        let mut inner = self.inner.lock();
        inner.discoveries += 1;
        Ok(inner.devices.clone())
    }

    async fn create_socket(&self, device: &PairedDevice, _service: Uuid) -> io::Result<MockSocket> {
        let mut inner = self.inner.lock();
        inner.check(Step::CreateSocket)?;
        inner.sockets_for.push(device.name.clone());
        Ok(MockSocket {
            inner: self.inner.clone(),
            connected: false,
        })
    }
}

pub struct MockSocket {
    inner: Arc<Mutex<Inner>>,
    connected: bool,
}

impl SerialSocket for MockSocket {
    type Writer = MockWriter;

    async fn connect(&mut self) -> io::Result<()> {
        let stalled = self.inner.lock().stalled.contains(&Step::Connect);
        if stalled {
            std::future::pending::<()>().await;
        }
        self.inner.lock().check(Step::Connect)?;
        self.connected = true;
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.closes += 1;
        self.connected = false;
        inner.check(Step::Close)
    }

    fn output_stream(&mut self) -> io::Result<MockWriter> {
        if !self.connected {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "not connected"));
        }
        self.inner.lock().check(Step::Stream)?;
        Ok(MockWriter {
            inner: self.inner.clone(),
        })
    }
}

pub struct MockWriter {
    inner: Arc<Mutex<Inner>>,
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut inner = self.inner.lock();
        if let Err(e) = inner.check(Step::Write) {
            return Poll::Ready(Err(e));
        }
        inner.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
