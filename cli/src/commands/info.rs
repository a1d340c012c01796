use clap::Parser;
use rusty_ytinfo::{Video, VideoOptions};

use crate::args::{log::LogArgs, output::OutputArgs, request_options::RequestOptionsArgs};
use crate::utils::result_serializer::ResultSerializer;

#[derive(Parser)]
pub struct InfoArgs {
    #[clap(
        short = 'i',
        long = "id",
        help = "Video ID or URL",
        num_args = 1,
        required = true
    )]
    pub id: String,

    #[clap(flatten)]
    pub request_options: RequestOptionsArgs,

    #[clap(flatten)]
    pub log: LogArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

impl InfoArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        self.log.init_logger();

        let video = Video::new_with_options(
            &self.id,
            VideoOptions::from(&self.request_options),
        )?;

        log::info!("Extracting {}", video.get_video_url());
        let extraction = video.extract().await?;

        if extraction.is_degraded() {
            log::info!(
                "{} piece(s) of information were missing, add `-l verbose` to list them",
                extraction.issues.len()
            );
        }

        let result = ResultSerializer::new(extraction, self.output.output_level.clone());
        println!("{}", self.output.output_format.serialize(&result)?);

        Ok(())
    }
}
