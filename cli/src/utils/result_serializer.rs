use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use rusty_ytinfo::{Extraction, StreamFormat, VideoInfo};

use crate::args::output::OutputLevel;

#[derive(Debug)]
pub struct ResultSerializer {
    output_level: OutputLevel,
    video_info: VideoInfo,
    issues: Vec<String>,
    formats: Vec<FormatSerializer>,
}

impl ResultSerializer {
    pub fn new(extraction: Extraction, output_level: OutputLevel) -> Self {
        let formats = extraction
            .info
            .formats
            .iter()
            .map(|format| FormatSerializer {
                format: format.clone(),
                output_level: output_level.clone(),
            })
            .collect::<Vec<_>>();

        Self {
            output_level,
            issues: extraction.issues.iter().map(|x| x.to_string()).collect(),
            video_info: extraction.info,
            formats,
        }
    }
}

impl Serialize for ResultSerializer {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if self.output_level.contains(OutputLevel::VIDEO) {
            map.serialize_entry("video_info", &VideoDetails::from(&self.video_info))?;
        }

        map.serialize_entry("streams", &self.formats)?;

        if self.output_level.contains(OutputLevel::VERBOSE) {
            map.serialize_entry("issues", &self.issues)?;
        }

        map.end()
    }
}

/// Everything of [`VideoInfo`] but the formats, printed on their own
#[derive(Debug, Serialize)]
struct VideoDetails<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    uploader: &'a str,
    publish_date: Option<String>,
    length_seconds: Option<u64>,
    keywords: &'a [String],
    song: Option<&'a str>,
    artist: Option<&'a str>,
    album: Option<&'a str>,
    writers: Option<&'a str>,
    dash_manifest_url: Option<&'a str>,
    hls_manifest_url: Option<&'a str>,
    html5player: &'a str,
}

impl<'a> From<&'a VideoInfo> for VideoDetails<'a> {
    fn from(info: &'a VideoInfo) -> Self {
        Self {
            id: &info.id,
            title: &info.title,
            description: &info.description,
            uploader: &info.uploader,
            publish_date: info.publish_date.map(|x| x.to_string()),
            length_seconds: info.duration.map(|x| x.as_secs()),
            keywords: &info.keywords,
            song: info.song.as_deref(),
            artist: info.artist.as_deref(),
            album: info.album.as_deref(),
            writers: info.writers.as_deref(),
            dash_manifest_url: info.dash_manifest_url.as_deref(),
            hls_manifest_url: info.hls_manifest_url.as_deref(),
            html5player: &info.html5player,
        }
    }
}

#[derive(Debug)]
struct FormatSerializer {
    pub output_level: OutputLevel,
    pub format: StreamFormat,
}

impl Serialize for FormatSerializer {
    fn serialize<S>(&self, serializer: S) -> Result<<S as Serializer>::Ok, <S as Serializer>::Error>
    where
        S: Serializer,
    {
        macro_rules! partly_serialize {
            ($self:ident, $map:ident; $($level:expr => { $($field:ident $(with $func:ident)?),* $(,)? })*) => {
                $(
                    if self.output_level.contains($level) {
                        $(
                            $map.serialize_entry(
                                stringify!($field),
                                &partly_serialize!{ @__ser($self.format.$field $(=> $func)?) }
                            )?;
                        )*
                    }
                )*
            };
            (@__ser($field:expr)) => { $field };
            (@__ser($field:expr => $func:ident)) => { $func(&$field) };
        }

        let mut map = serializer.serialize_map(None)?;

        partly_serialize!(self, map;
            OutputLevel::GENERAL => {
                itag, adaptive, mime_type, quality, has_video, has_audio,
                approx_duration_ms, url
            }

            OutputLevel::VIDEO_TRACK => {
                height, width, quality_label, fps
            }

            OutputLevel::AUDIO_TRACK => {
                audio_quality, bitrate, average_bitrate, audio_sample_rate, audio_channels
            }

            OutputLevel::all() => {
                content_length, index_range, init_range, last_modified, is_live, is_hls, is_dash_mpd
            }
        );

        map.end()
    }
}
