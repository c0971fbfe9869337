//! List the voices the speech engine offers
//!
//! Handy for picking a value for `voice` in `~/.recite.cfg`.

use anyhow::Context;
use recite::speech::create_speech_service;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let mut speech = match create_speech_service() {
        Ok(speech) => speech,
        Err(e) => {
            println!("{}", recite::UNSUPPORTED_MESSAGE);
            return Err(e).context("no speech engine");
        }
    };
    let voices = speech.voices().context("failed to list voices")?;

    if voices.is_empty() {
        println!("No voices reported (the engine default will be used)");
        return Ok(());
    }

    for (i, voice) in voices.iter().enumerate() {
        println!("{:>3}. {}", i + 1, voice.label());
    }
    Ok(())
}
