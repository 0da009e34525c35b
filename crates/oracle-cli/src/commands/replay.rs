//! `oracle replay`: drive a session from a script.
//!
//! Each non-blank line is one JSON step:
//!
//! ```text
//! {"intent": {"type": "submit_problem", "problem": "Launch a bakery"}}
//! {"push": {"seq": 1, "currentQuestion": "What budget do you have?"}}
//! {"wait": {"ms": 30000}}
//! ```
//!
//! Lines starting with `#` are comments.

use anyhow::{Context, Result};
use oracle_application::{ChannelCollaborator, ConfigService, Notice, SessionController};
use oracle_core::session::{AgentPush, OutboundRequest, UiIntent};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::diagnostics::{self, Diagnostic};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScriptStep {
    /// A user action
    Intent(UiIntent),
    /// A collaborator reply
    Push(AgentPush),
    /// Lets simulated time pass, expiring an overdue request
    Wait { ms: u64 },
}

/// What a replay produced besides the final session.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub sent: Vec<OutboundRequest>,
    /// (1-based script line, notice)
    pub notices: Vec<(usize, Notice)>,
}

pub fn parse_script(text: &str) -> Result<Vec<(usize, ScriptStep)>> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            let step = serde_json::from_str(line)
                .with_context(|| format!("Invalid step on line {}", number))?;
            Ok((number, step))
        })
        .collect()
}

pub async fn replay(
    controller: &mut SessionController<ChannelCollaborator>,
    requests: &mut mpsc::UnboundedReceiver<OutboundRequest>,
    steps: Vec<(usize, ScriptStep)>,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    let mut clock = Instant::now();

    for (line, step) in steps {
        let notice = match step {
            ScriptStep::Intent(intent) => controller.dispatch(intent).await,
            ScriptStep::Push(push) => controller
                .receive(push)
                .err()
                .map(|e| Notice::from_error("push", &e)),
            ScriptStep::Wait { ms } => {
                clock = clock.max(Instant::now()) + Duration::from_millis(ms);
                controller.expire_stale_request(clock)
            }
        };
        if let Some(notice) = notice {
            report.notices.push((line, notice));
        }
        while let Ok(request) = requests.try_recv() {
            report.sent.push(request);
        }
    }

    report
}

pub async fn run(
    script: &Path,
    config_service: &ConfigService,
    mut diagnostics: mpsc::UnboundedReceiver<Diagnostic>,
) -> Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = parse_script(&text)?;
    let config = config_service.get_config()?;

    tracing::info!(
        "[Replay] {} steps from {}",
        steps.len(),
        script.display()
    );

    let (collaborator, mut requests) = ChannelCollaborator::channel();
    let mut controller = SessionController::new(Arc::new(collaborator), config);
    let report = replay(&mut controller, &mut requests, steps).await;

    for request in &report.sent {
        eprintln!("→ #{} {}", request.seq, request.text);
    }
    for (line, notice) in &report.notices {
        eprintln!(
            "⚠️  line {} [{}] {:?}: {}",
            line, notice.source, notice.level, notice.message
        );
    }

    let map = controller.session().map_state();
    if let Some(active) = map.active_node_id.as_deref() {
        eprintln!("📍 {}", map.parent_chain(active).join(" > "));
    }
    println!("{}", serde_json::to_string_pretty(controller.session())?);

    let captured = diagnostics::drain(&mut diagnostics);
    if !captured.is_empty() {
        eprintln!("{} warning(s) logged during replay:", captured.len());
        for diagnostic in &captured {
            eprintln!("  {}", diagnostic);
        }
    }
    if controller.is_waiting() {
        eprintln!("⏳ Still waiting on the collaborator");
    }

    Ok(())
}
