pub mod broadcaster;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod games;
pub mod hub;
pub mod protocol;
pub mod sample;
pub mod scheduler;
pub mod session;
pub mod signal;
pub mod supervisor;

pub use broadcaster::{BroadcastTicker, DeliveryReport, GazeBroadcaster, SubscriptionHandle};
pub use engine::{Game, GameCtx, GameEvent, GameTimer, InteractionEngine, Playfield, Scene, SceneItem};
pub use error::{ProtocolError, SessionError, TransportError};
pub use games::GameKind;
pub use hub::{CalibrationEvent, CalibrationMonitor, GazeHub, SampleSource};
pub use sample::{CalibrationStatus, GazeFrame, RawSample};
pub use scheduler::{Scheduler, TaskHandle, TaskSet, VirtualScheduler};
pub use session::Arcade;
pub use signal::{GazeSignalProcessor, IngestOutcome};
pub use supervisor::{
    ConnectionState, ConnectionSupervisor, EventSink, ReadyState, TrackerConfig, Transport, TransportEvent,
};
