//! Symphonia probing helpers for tags and durations.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use log::debug;
use symphonia::core::{
    codecs::{CodecParameters, CODEC_TYPE_NULL},
    errors::Error,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream},
    meta::{MetadataOptions, MetadataRevision, StandardTagKey},
    probe::{Hint, ProbeResult},
};

/// Title and artist as found in a file's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Convert Symphonia codec parameters to a duration using time base and frames.
pub fn duration_from_frames(codec_params: &CodecParameters) -> Option<Duration> {
    let tb = codec_params.time_base?;
    let frames = codec_params.n_frames?;
    let time = tb.calc_time(codec_params.start_ts + frames);

    Some(Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac))
}

/// Probe a media file, using its extension as a format hint.
pub fn probe_file(path: &Path) -> Result<ProbeResult, Error> {
    let file = File::open(path)?;
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(&ext.to_lowercase());
    }

    let source = Box::new(file) as Box<dyn MediaSource>;
    let mss = MediaSourceStream::new(source, Default::default());
    let format_opts = FormatOptions {
        ..Default::default()
    };
    let metadata_opts: MetadataOptions = Default::default();

    symphonia::default::get_probe().format(&hint, mss, &format_opts, &metadata_opts)
}

/// Read the title and artist tags of a file.
///
/// Unreadable files and files without tags both produce empty [`TrackTags`].
pub fn read_tags(path: &Path) -> TrackTags {
    let mut probed = match probe_file(path) {
        Ok(probed) => probed,
        Err(err) => {
            debug!("no tags for {}: {}", path.display(), err);
            return TrackTags::default();
        }
    };

    let mut tags = TrackTags::default();

    // Tags found ahead of the container (e.g. ID3v2) come first, the
    // container's own metadata may fill in what is still missing.
    if let Some(metadata) = probed.metadata.get() {
        if let Some(revision) = metadata.current() {
            collect_tags(revision, &mut tags);
        }
    }
    if let Some(revision) = probed.format.metadata().current() {
        collect_tags(revision, &mut tags);
    }

    tags
}

fn collect_tags(revision: &MetadataRevision, tags: &mut TrackTags) {
    for tag in revision.tags() {
        let slot = match tag.std_key {
            Some(StandardTagKey::TrackTitle) => &mut tags.title,
            Some(StandardTagKey::Artist) => &mut tags.artist,
            _ => continue,
        };
        if slot.is_none() {
            let value = tag.value.to_string();
            let value = value.trim();
            if !value.is_empty() {
                *slot = Some(value.to_string());
            }
        }
    }
}

/// Best-effort playing time of the first decodable track in a file.
pub fn probe_duration(path: &Path) -> Option<Duration> {
    let probed = probe_file(path).ok()?;
    probed
        .format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .and_then(|track| duration_from_frames(&track.codec_params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::units::TimeBase;

    #[test]
    fn duration_uses_time_base_and_frames() {
        let mut params = CodecParameters::new();
        params
            .with_time_base(TimeBase::new(1, 44_100))
            .with_n_frames(44_100 * 3 + 22_050);
        assert_eq!(duration_from_frames(&params), Some(Duration::from_millis(3_500)));
    }

    #[test]
    fn duration_needs_frame_count() {
        let mut params = CodecParameters::new();
        params.with_time_base(TimeBase::new(1, 48_000));
        assert_eq!(duration_from_frames(&params), None);
    }

    #[test]
    fn unreadable_file_has_no_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not an mpeg stream").unwrap();
        assert_eq!(read_tags(&path), TrackTags::default());
        assert_eq!(probe_duration(&path), None);
    }
}
