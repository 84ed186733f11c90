//! Simulate command implementation.

use crate::audio::{AudioCall, AudioRoute, MockInCallAudio};
use crate::capability::{missing_module, Outcome};
use crate::config::CallConfig;
use crate::coordinator::CallCoordinator;
use crate::foreground::{
    ForegroundEvent, ForegroundHandlers, ForegroundOptions, MockForegroundService, ServiceCall,
    FOREGROUND_ACTION_LEAVE,
};
use crate::platform::{AppState, MockAppLifecycle, Platform};
use crate::session::CallId;
use crate::telephony::{CallEvent, MockCallProvider, ProviderCall};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Arguments for the simulate command
#[derive(Args, Clone)]
pub struct SimulateArgs {
    /// Platform family to simulate
    #[arg(short, long, value_enum, default_value = "android")]
    pub platform: Platform,

    /// Meeting code for the foreground notification
    #[arg(short, long)]
    pub room_id: Option<String>,

    /// Handle shown on the native call card
    #[arg(long, default_value = "conclave")]
    pub handle: String,

    /// Display name shown on the native call card
    #[arg(long, default_value = "Conclave")]
    pub display_name: String,

    /// Audio route to switch to once the call is up
    #[arg(long, value_enum)]
    pub route: Option<AudioRoute>,

    /// Make the call provider's setup fail
    #[arg(long)]
    pub fail_setup: bool,

    /// Make the foreground service module fail to load
    #[arg(long)]
    pub missing_module: bool,

    /// Leave through the notification button instead of the app
    #[arg(long)]
    pub press_leave: bool,

    /// Hang up from the system call UI instead of the app
    #[arg(long)]
    pub hang_up: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct Step {
    pub operation: &'static str,
    pub outcome: Outcome,
}

/// Everything the simulated native layer observed
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub platform: Platform,
    pub call_id: CallId,
    pub steps: Vec<Step>,
    pub provider_calls: Vec<ProviderCall>,
    pub service_calls: Vec<ServiceCall>,
    pub audio_calls: Vec<AudioCall>,
}

/// Run the simulate command
pub async fn run(args: SimulateArgs, config: CallConfig) -> Result<()> {
    let json = args.json;
    let report = simulate(args, config).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Drive one full call lifecycle and collect what the mocks recorded
pub async fn simulate(args: SimulateArgs, config: CallConfig) -> SimulationReport {
    let provider = Arc::new(if args.fail_setup {
        MockCallProvider::failing_setup()
    } else {
        MockCallProvider::new()
    });
    let service = Arc::new(MockForegroundService::new());
    let audio = Arc::new(MockInCallAudio::new());
    let lifecycle = Arc::new(MockAppLifecycle::new());

    let builder = CallCoordinator::builder(args.platform)
        .config(config)
        .telephony_provider(provider.clone())
        .audio(audio.clone())
        .lifecycle(lifecycle.clone());
    let builder = if args.missing_module {
        builder.foreground(|| Err(missing_module("ForegroundService")))
    } else {
        builder.foreground_service(service.clone())
    };
    let coordinator = Arc::new(builder.build());

    let mut steps = Vec::new();
    steps.push(Step {
        operation: "ensure_call_keep",
        outcome: coordinator.ensure_call_keep().await,
    });

    let hangup = Arc::clone(&coordinator);
    let call_keep_handlers = coordinator.register_call_keep_handlers(Arc::new(move || {
        info!("Hang-up from system call UI");
        hangup.end_call_session(None);
    }));

    let call_id = coordinator.start_call_session(&args.handle, &args.display_name);
    steps.push(Step {
        operation: "start_in_call",
        outcome: coordinator.start_in_call(),
    });

    let options = ForegroundOptions {
        room_id: args.room_id.clone(),
    };
    steps.push(Step {
        operation: "start_foreground_call_service",
        outcome: coordinator.start_foreground_call_service(Some(&options)).await,
    });

    let leaver = Arc::clone(&coordinator);
    let foreground_handlers = coordinator.register_foreground_call_service_handlers(ForegroundHandlers {
        on_leave: Some(Arc::new(move || {
            info!("Leave pressed on call notification");
            leaver.end_call_session(None);
        })),
        on_open: Some(Arc::new(|| info!("Call notification opened"))),
    });

    if let Some(route) = args.route {
        steps.push(Step {
            operation: "set_audio_route",
            outcome: coordinator.set_audio_route(route),
        });
    }

    lifecycle.set_state(AppState::Background);
    lifecycle.set_state(AppState::Active);
    steps.push(Step {
        operation: "update_foreground_call_service",
        outcome: coordinator.update_foreground_call_service(Some(&options)).await,
    });

    if args.press_leave {
        service.press(ForegroundEvent::button(FOREGROUND_ACTION_LEAVE));
    }
    if args.hang_up {
        provider.emit(CallEvent::EndCall);
    }

    steps.push(Step {
        operation: "end_call_session",
        outcome: coordinator.end_call_session(Some(&call_id)),
    });
    steps.push(Step {
        operation: "stop_foreground_call_service",
        outcome: coordinator.stop_foreground_call_service().await,
    });
    steps.push(Step {
        operation: "stop_in_call",
        outcome: coordinator.stop_in_call(),
    });

    foreground_handlers.unsubscribe();
    call_keep_handlers.unsubscribe();
    coordinator.shutdown();

    SimulationReport {
        platform: args.platform,
        call_id,
        steps,
        provider_calls: provider.calls(),
        service_calls: service.calls(),
        audio_calls: audio.calls(),
    }
}

fn print_report(report: &SimulationReport) {
    println!("Call simulation on {}", report.platform);
    println!("  Call ID: {}", report.call_id);
    println!();
    println!("Steps:");
    for step in &report.steps {
        println!("  {:<32} {:?}", step.operation, step.outcome);
    }
    println!();
    println!("Call provider ({} requests):", report.provider_calls.len());
    for call in &report.provider_calls {
        println!("  {:?}", call);
    }
    println!("Foreground service ({} requests):", report.service_calls.len());
    for call in &report.service_calls {
        match call {
            ServiceCall::Start(n) | ServiceCall::Update(n) => {
                println!("  {}: {}", call_name(call), n.message)
            }
            other => println!("  {:?}", other),
        }
    }
    println!("In-call audio ({} requests):", report.audio_calls.len());
    for call in &report.audio_calls {
        println!("  {:?}", call);
    }
}

fn call_name(call: &ServiceCall) -> &'static str {
    match call {
        ServiceCall::Start(_) => "Start",
        ServiceCall::Update(_) => "Update",
        ServiceCall::Stop => "Stop",
        ServiceCall::StopAll => "StopAll",
        ServiceCall::AddListener => "AddListener",
        ServiceCall::RemoveListener => "RemoveListener",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(platform: Platform) -> SimulateArgs {
        SimulateArgs {
            platform,
            room_id: Some("ABCD".to_string()),
            handle: "conclave".to_string(),
            display_name: "Conclave".to_string(),
            route: None,
            fail_setup: false,
            missing_module: false,
            press_leave: false,
            hang_up: false,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_android_simulation() {
        let report = simulate(args(Platform::Android), CallConfig::default()).await;

        assert!(report.provider_calls.is_empty());
        assert!(matches!(report.service_calls.first(), Some(ServiceCall::Start(n)) if n.message == "Meeting code: ABCD"));
        assert!(report.service_calls.contains(&ServiceCall::Stop));
        assert_eq!(report.audio_calls.last(), Some(&AudioCall::Stop));
    }

    #[tokio::test]
    async fn test_ios_hang_up_simulation() {
        let mut args = args(Platform::Ios);
        args.hang_up = true;
        let report = simulate(args, CallConfig::default()).await;

        let ends = report
            .provider_calls
            .iter()
            .filter(|call| matches!(call, ProviderCall::EndCall(_)))
            .count();
        assert_eq!(ends, 1);
        assert!(report.service_calls.is_empty());

        let end_step = report.steps.iter().find(|s| s.operation == "end_call_session");
        assert_eq!(end_step.map(|s| &s.outcome), Some(&Outcome::Skipped));
    }

    #[tokio::test]
    async fn test_missing_module_simulation() {
        let mut args = args(Platform::Android);
        args.missing_module = true;
        args.press_leave = true;
        let report = simulate(args, CallConfig::default()).await;

        assert!(report.service_calls.is_empty());
        assert!(report
            .steps
            .iter()
            .filter(|s| s.operation.contains("foreground"))
            .all(|s| s.outcome == Outcome::Skipped));
    }
}
