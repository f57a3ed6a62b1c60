//! Transport control surface.

use log::debug;

use super::Coordinator;

/// Operations a generic media-control widget invokes.
///
/// Times are milliseconds. Local files have no buffering and no audio session,
/// so those queries have fixed answers.
pub trait TransportControl {
    fn start(&self);

    fn pause(&self);

    fn seek_to(&self, position_ms: u64);

    fn duration(&self) -> u64;

    fn current_position(&self) -> u64;

    fn is_playing(&self) -> bool;

    fn buffer_percentage(&self) -> u8 {
        0
    }

    fn can_pause(&self) -> bool {
        true
    }

    fn can_seek_backward(&self) -> bool {
        true
    }

    fn can_seek_forward(&self) -> bool {
        true
    }

    fn audio_session_id(&self) -> u32 {
        0
    }
}

impl TransportControl for Coordinator {
    fn start(&self) {
        if let Err(err) = Coordinator::resume(self) {
            debug!("start: {}", err);
        }
    }

    fn pause(&self) {
        if let Err(err) = Coordinator::pause(self) {
            debug!("pause: {}", err);
        }
    }

    fn seek_to(&self, position_ms: u64) {
        if let Err(err) = Coordinator::seek(self, position_ms) {
            debug!("seek: {}", err);
        }
    }

    fn duration(&self) -> u64 {
        Coordinator::duration(self)
    }

    fn current_position(&self) -> u64 {
        Coordinator::position(self)
    }

    fn is_playing(&self) -> bool {
        Coordinator::is_playing(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;
    use crate::playback::{WorkerCommand, WorkerHandle};

    #[test]
    fn surface_drives_the_session() {
        let coordinator = Coordinator::new();
        let (handle, commands) = WorkerHandle::channel();
        coordinator.on_connection_established(handle.clone());
        coordinator.on_scan_completed(vec![Track::new(1, "Alpha", "A")]);
        coordinator.select_track(0).unwrap();

        let surface: &dyn TransportControl = &coordinator;
        surface.pause();
        surface.seek_to(4_000);
        surface.start();
        handle.update_status(|status| {
            status.playing = true;
            status.position_ms = 4_000;
            status.duration_ms = 10_000;
        });

        assert!(surface.is_playing());
        assert_eq!(surface.current_position(), 4_000);
        assert_eq!(surface.duration(), 10_000);
        assert!(surface.can_pause() && surface.can_seek_backward() && surface.can_seek_forward());
        assert_eq!(surface.buffer_percentage(), 0);
        assert_eq!(surface.audio_session_id(), 0);

        let sent: Vec<WorkerCommand> = commands.try_iter().collect();
        assert_eq!(
            &sent[1..],
            &[
                WorkerCommand::PlayAt(0),
                WorkerCommand::Pause,
                WorkerCommand::SeekTo(4_000),
                WorkerCommand::Resume,
            ]
        );
    }

    #[test]
    fn surface_is_neutral_before_selection() {
        let coordinator = Coordinator::new();
        let surface: &dyn TransportControl = &coordinator;
        surface.start();
        surface.pause();
        assert_eq!(surface.duration(), 0);
        assert_eq!(surface.current_position(), 0);
        assert!(!surface.is_playing());
    }
}
