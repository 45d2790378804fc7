//! Run command handler - the interactive scanner.
//!
//! Reads one command per line from stdin and prints controller events as
//! they arrive. `scan` and `speak` run as background tasks so that a second
//! `speak` can pause playback that is still going.

use std::sync::Arc;

use anyhow::Result;
use seeforme_core::domain::CameraFacing;
use seeforme_scan::{ScanController, ScanEvent, ScanOutcome, SpeakOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::bootstrap::CliContext;

/// One line of REPL input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplCommand {
    Scan,
    Speak,
    Flip,
    New,
    Init,
    Help,
    Quit,
}

impl ReplCommand {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "scan" | "s" => Some(Self::Scan),
            "speak" | "p" => Some(Self::Speak),
            "flip" | "f" => Some(Self::Flip),
            "new" | "n" => Some(Self::New),
            "init" | "retry" => Some(Self::Init),
            "help" | "?" => Some(Self::Help),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "\
Commands:
  scan   capture the snapshot and describe it
  speak  speak the description (again to pause)
  flip   switch between the back and front camera
  new    clear the result and start over
  init   retry loading the vision model
  quit   exit";

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let (controller, mut events) = ScanController::new(
        Arc::clone(&ctx.session),
        Arc::clone(&ctx.speech),
        Arc::clone(&ctx.capture),
        ctx.scan_config(),
    );
    let controller = Arc::new(controller);

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = render_event(&event) {
                println!("{line}");
            }
        }
    });

    println!("Loading vision model...");
    // Failures are reported through the event printer.
    let _ = controller.initialize().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match ReplCommand::parse(&line) {
            Some(ReplCommand::Scan) => {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    if let Some(message) = render_scan(&controller.scan().await) {
                        println!("{message}");
                    }
                });
            }
            Some(ReplCommand::Speak) => {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    if let Some(message) = render_speak(&controller.speak_again().await) {
                        println!("{message}");
                    }
                });
            }
            Some(ReplCommand::Flip) => {
                if let Err(rejection) = controller.flip_camera() {
                    println!("{rejection}");
                }
            }
            Some(ReplCommand::New) => match controller.new_scan() {
                Ok(()) => println!("Ready for a new scan."),
                Err(rejection) => println!("{rejection}"),
            },
            Some(ReplCommand::Init) => {
                let _ = controller.initialize().await;
            }
            Some(ReplCommand::Help) => println!("{HELP}"),
            Some(ReplCommand::Quit) => break,
            None => println!("Unknown command: {} (type 'help')", line.trim()),
        }
    }

    debug!("Leaving interactive scanner");
    controller.teardown();
    printer.abort();
    Ok(())
}

fn render_event(event: &ScanEvent) -> Option<String> {
    match event {
        ScanEvent::StateChanged(state) => Some(format!("[{}]", state.label())),
        ScanEvent::ModelReady => Some("Vision model ready.".to_owned()),
        ScanEvent::InitializationFailed(reason) => Some(format!(
            "Could not load the vision model: {reason}\nType 'init' to retry."
        )),
        ScanEvent::CameraFlipped(facing) => {
            Some(format!("Using the {} camera.", facing_label(*facing)))
        }
        ScanEvent::CaptureFailed(reason) => Some(format!("Capture failed: {reason}")),
        ScanEvent::AnalysisFailed(reason) => Some(format!("Analysis failed: {reason}")),
        ScanEvent::ResultReady(description) => Some(format!("\n{description}\n")),
        ScanEvent::SpeechUnavailable(reason) => Some(format!("Speech unavailable: {reason}")),
        ScanEvent::SpeakingStarted | ScanEvent::SpeakingFinished => None,
    }
}

const fn facing_label(facing: CameraFacing) -> &'static str {
    match facing {
        CameraFacing::Back => "back",
        CameraFacing::Front => "front",
    }
}

fn render_scan(outcome: &ScanOutcome) -> Option<String> {
    match outcome {
        ScanOutcome::Rejected(rejection) => Some(format!("Scan ignored: {rejection}")),
        ScanOutcome::Described(_) | ScanOutcome::CaptureFailed(_) | ScanOutcome::Abandoned => {
            None
        }
    }
}

fn render_speak(outcome: &SpeakOutcome) -> Option<String> {
    match outcome {
        SpeakOutcome::Paused => Some("Paused.".to_owned()),
        SpeakOutcome::Rejected(rejection) => Some(format!("Speak ignored: {rejection}")),
        SpeakOutcome::Spoke(_) | SpeakOutcome::Failed(_) => None,
    }
}
