//! UDP radio link
//!
//! Talks to a radio modem bridge (or a simulator) that speaks JSON-encoded
//! [`RadioFrame`]s over UDP. Responsibilities:
//! - bind the local socket and spawn the receive task on `open`
//! - dispatch unsolicited `Data` and `IoSample` frames to registered listeners
//! - match `AtResponse`/`DiscoverResponse` frames to the pending request with
//!   the same frame id
//!
//! Datagrams from any address other than the configured peer are ignored.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{DataListener, NodeAddress, RadioFrame, RadioLink, SampleListener};
use crate::config::RadioSettings;
use crate::utils::RadioError;

const MAX_DATAGRAM: usize = 65_507;

type PendingRequests = Mutex<HashMap<u8, oneshot::Sender<RadioFrame>>>;

#[derive(Default)]
struct Listeners {
    data: RwLock<Vec<Arc<dyn DataListener>>>,
    sample: RwLock<Vec<Arc<dyn SampleListener>>>,
}

pub struct UdpRadioLink {
    address: NodeAddress,
    peer: SocketAddr,
    socket: Arc<UdpSocket>,
    open: AtomicBool,
    next_frame_id: AtomicU8,
    pending: Arc<PendingRequests>,
    listeners: Arc<Listeners>,
    response_timeout: Duration,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

impl UdpRadioLink {
    /// Bind the local socket and start receiving frames from the peer.
    pub async fn open(settings: &RadioSettings) -> Result<Self, RadioError> {
        let address: NodeAddress = settings.address.parse()?;
        let peer = tokio::net::lookup_host(&settings.peer)
            .await?
            .next()
            .ok_or_else(|| {
                RadioError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("cannot resolve radio peer {}", settings.peer),
                ))
            })?;
        let socket = Arc::new(UdpSocket::bind(&settings.bind).await?);

        let pending: Arc<PendingRequests> = Arc::new(Mutex::new(HashMap::new()));
        let listeners = Arc::new(Listeners::default());

        let receiver = tokio::spawn(receive_loop(
            socket.clone(),
            peer,
            pending.clone(),
            listeners.clone(),
        ));

        info!(
            address = %address,
            local = %socket.local_addr()?,
            peer = %peer,
            "Radio link open"
        );

        Ok(Self {
            address,
            peer,
            socket,
            open: AtomicBool::new(true),
            next_frame_id: AtomicU8::new(1),
            pending,
            listeners,
            response_timeout: Duration::from_millis(settings.response_timeout_ms),
            receiver: Mutex::new(Some(receiver)),
        })
    }

    pub fn local_socket_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Reserve a frame id for a request and register its waiter.
    ///
    /// Id 0 means "no response requested" on the radio and ids still awaiting
    /// a response are skipped, so at most 255 requests can be in flight.
    fn reserve_frame_id(&self, waiter: oneshot::Sender<RadioFrame>) -> Result<u8, RadioError> {
        let mut pending = self.pending.lock();
        for _ in 0..=u8::MAX {
            let id = self.next_frame_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 && !pending.contains_key(&id) {
                pending.insert(id, waiter);
                return Ok(id);
            }
        }
        Err(RadioError::Busy)
    }

    async fn transmit(&self, frame: &RadioFrame) -> Result<(), RadioError> {
        let bytes = serde_json::to_vec(frame)?;
        self.socket.send_to(&bytes, self.peer).await?;
        trace!(peer = %self.peer, len = bytes.len(), "Frame transmitted");
        Ok(())
    }
}

#[async_trait]
impl RadioLink for UdpRadioLink {
    fn local_address(&self) -> NodeAddress {
        self.address.clone()
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), RadioError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(receiver) = self.receiver.lock().take() {
            receiver.abort();
        }
        // dropping the senders wakes every waiter with `Closed`
        self.pending.lock().clear();
        info!(address = %self.address, "Radio link closed");
        Ok(())
    }

    async fn send(&self, frame: RadioFrame) -> Result<Option<RadioFrame>, RadioError> {
        if !self.is_open() {
            return Err(RadioError::NotOpen);
        }

        if !frame.expects_response() {
            self.transmit(&frame).await?;
            return Ok(None);
        }

        let (tx, rx) = oneshot::channel();
        let id = self.reserve_frame_id(tx)?;
        let frame = frame.with_frame_id(id);

        if let Err(e) = self.transmit(&frame).await {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.response_timeout, rx).await {
            Ok(Ok(response)) => Ok(Some(response)),
            Ok(Err(_)) => Err(RadioError::Closed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(RadioError::Timeout)
            }
        }
    }

    fn register_data_listener(&self, listener: Arc<dyn DataListener>) {
        self.listeners.data.write().push(listener);
    }

    fn register_sample_listener(&self, listener: Arc<dyn SampleListener>) {
        self.listeners.sample.write().push(listener);
    }
}

impl Drop for UdpRadioLink {
    fn drop(&mut self) {
        if let Some(receiver) = self.receiver.get_mut().take() {
            receiver.abort();
        }
    }
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    pending: Arc<PendingRequests>,
    listeners: Arc<Listeners>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "Radio receive failed");
                continue;
            }
        };
        if from != peer {
            debug!(%from, "Ignoring datagram from unknown sender");
            continue;
        }
        match serde_json::from_slice::<RadioFrame>(&buf[..len]) {
            Ok(frame) => dispatch(frame, &pending, &listeners),
            Err(e) => warn!(error = %e, "Discarding undecodable radio frame"),
        }
    }
}

fn dispatch(frame: RadioFrame, pending: &PendingRequests, listeners: &Listeners) {
    match frame {
        RadioFrame::Data { node, payload } => {
            for listener in listeners.data.read().iter() {
                listener.data_received(&node, &payload);
            }
        }
        RadioFrame::IoSample { node, sample } => {
            for listener in listeners.sample.read().iter() {
                listener.sample_received(&node, &sample);
            }
        }
        response @ (RadioFrame::AtResponse { .. } | RadioFrame::DiscoverResponse { .. }) => {
            let Some(id) = response.frame_id() else {
                return;
            };
            match pending.lock().remove(&id) {
                Some(waiter) => {
                    let _ = waiter.send(response);
                }
                None => debug!(frame_id = id, "Response for unknown or expired request"),
            }
        }
        other => debug!(?other, "Ignoring unexpected frame from radio"),
    }
}
