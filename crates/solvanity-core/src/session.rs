//! Grind session: one request, from constraints to its final stream event

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use solvanity_crypto::{encode_private_key, public_key_base58};
use solvanity_pattern::{format_difficulty, Invocation, SearchConstraints};

use crate::error::GrindError;
use crate::event::{EncodedResult, StreamEvent};
use crate::extract::extract;
use crate::process::{GrindProcess, ProcessEvent, ToolCommand};
use crate::stats::RunStats;

/// Session configuration shared by all requests
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How to start `solana-keygen`
    pub keygen: ToolCommand,
    /// Parent of the per-request scratch directories
    pub work_root: PathBuf,
    /// Maximum wall-clock time per search in seconds (0 = unlimited)
    pub max_runtime_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keygen: ToolCommand::new("solana-keygen"),
            work_root: std::env::temp_dir(),
            max_runtime_secs: 0,
        }
    }
}

enum Step {
    Event(Option<ProcessEvent>),
    Disconnected,
    TimedOut,
}

/// One grind request. Building it validates the constraints, so an invalid
/// request is refused before anything is spawned.
pub struct GrindSession {
    constraints: SearchConstraints,
    invocation: Invocation,
    config: SessionConfig,
}

impl GrindSession {
    pub fn new(constraints: SearchConstraints, config: SessionConfig) -> Result<Self, GrindError> {
        let invocation = Invocation::build(&constraints)?;
        Ok(Self {
            constraints,
            invocation,
            config,
        })
    }

    /// Run the search, pushing events into `events` as they happen.
    ///
    /// Tool output becomes `log` events; the stream ends with one `result` or
    /// one `error` event. If the receiver goes away the grinder is killed.
    pub async fn run(self, events: mpsc::Sender<StreamEvent>) -> Result<EncodedResult, GrindError> {
        let mut stats = RunStats::new();

        info!(
            "Starting grind: {} {} (difficulty {})",
            self.config.keygen.program.display(),
            self.invocation,
            self.constraints
                .difficulty()
                .map(format_difficulty)
                .unwrap_or_else(|| "n/a".to_string())
        );

        let outcome = match tempfile::Builder::new()
            .prefix("solvanity-")
            .tempdir_in(&self.config.work_root)
        {
            Ok(work_dir) => {
                let outcome = self.drive(work_dir.path(), &events, &mut stats).await;
                // Leftover keypair files (e.g. count > 1) go with the directory
                if let Err(e) = work_dir.close() {
                    warn!("Could not remove work directory: {}", e);
                }
                outcome
            }
            Err(e) => Err(GrindError::Io(e)),
        };

        match &outcome {
            Ok(result) => {
                info!("Found {} {}", result.pubkey, stats.format());
                let _ = events.send(result.clone().into()).await;
            }
            Err(GrindError::Disconnected) => {
                info!("Client disconnected, grinder terminated {}", stats.format());
            }
            Err(e) => {
                warn!("Grind failed: {} {}", e, stats.format());
                let _ = events.send(StreamEvent::error(e.to_string())).await;
            }
        }

        outcome
    }

    async fn drive(
        &self,
        work_dir: &Path,
        events: &mpsc::Sender<StreamEvent>,
        stats: &mut RunStats,
    ) -> Result<EncodedResult, GrindError> {
        let mut process = GrindProcess::spawn(&self.config.keygen, &self.invocation, work_dir)?;
        debug!("Grinder pid {:?} in {}", process.id(), work_dir.display());

        let deadline = match self.config.max_runtime_secs {
            0 => None,
            secs => Some(Instant::now() + Duration::from_secs(secs)),
        };

        loop {
            let step = tokio::select! {
                event = process.next_event() => Step::Event(event),
                _ = events.closed() => Step::Disconnected,
                _ = wait_until(deadline) => Step::TimedOut,
            };

            match step {
                Step::Event(Some(ProcessEvent::Line(line))) => {
                    stats.record_line(line.stream);
                    if events.send(StreamEvent::log(line.text)).await.is_err() {
                        process.kill().await;
                        return Err(GrindError::Disconnected);
                    }
                }
                Step::Event(Some(ProcessEvent::Completed(status))) => {
                    debug!("Grinder finished: {}", status);
                    break;
                }
                Step::Event(Some(ProcessEvent::Failed(message))) => {
                    return Err(GrindError::ProcessNonZeroExit(message));
                }
                Step::Event(None) => break,
                Step::Disconnected => {
                    process.kill().await;
                    return Err(GrindError::Disconnected);
                }
                Step::TimedOut => {
                    process.kill().await;
                    return Err(GrindError::TimedOut(self.config.max_runtime_secs));
                }
            }
        }

        let material = extract(process.transcript(), work_dir)?.resolve()?;

        let private_key = encode_private_key(&material.private_key_bytes)?;
        let derived = public_key_base58(&material.private_key_bytes)?;
        if derived != material.pubkey {
            return Err(GrindError::PubkeyMismatch {
                reported: material.pubkey,
                derived,
            });
        }

        Ok(EncodedResult {
            pubkey: material.pubkey,
            private_key,
        })
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::tests::fake_tool;
    use solvanity_crypto::{base58_encode, decode_private_key, Ed25519Keypair};

    struct Fixture {
        work_root: tempfile::TempDir,
        pubkey: String,
        keypair_json: String,
        keypair_bytes: Vec<u8>,
    }

    impl Fixture {
        fn new() -> Self {
            let keypair = Ed25519Keypair::from_seed(&[5u8; 32]);
            let keypair_bytes = keypair.keypair_bytes().to_vec();
            let values: Vec<String> = keypair_bytes.iter().map(|b| b.to_string()).collect();
            Self {
                work_root: tempfile::tempdir().unwrap(),
                pubkey: base58_encode(&keypair.public_key_bytes()),
                keypair_json: format!("[{}]", values.join(",")),
                keypair_bytes,
            }
        }

        fn config(&self, script: &str) -> SessionConfig {
            SessionConfig {
                keygen: fake_tool(script),
                work_root: self.work_root.path().to_path_buf(),
                max_runtime_secs: 0,
            }
        }

        fn work_root_is_empty(&self) -> bool {
            std::fs::read_dir(self.work_root.path()).unwrap().next().is_none()
        }
    }

    async fn run_collect(
        session: GrindSession,
    ) -> (Result<EncodedResult, GrindError>, Vec<StreamEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let outcome = session.run(tx).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (outcome, events)
    }

    fn count_logs(events: &[StreamEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Log { .. }))
            .count()
    }

    fn has_result(events: &[StreamEvent]) -> bool {
        events.iter().any(|e| matches!(e, StreamEvent::Result { .. }))
    }

    #[tokio::test]
    async fn test_file_reference_success() {
        let fx = Fixture::new();
        let script = format!(
            "echo 'Searching with 2 threads for:'; printf '%s' '{json}' > {pk}.json; echo 'Wrote keypair to {pk}.json'",
            json = fx.keypair_json,
            pk = fx.pubkey
        );
        let session = GrindSession::new(SearchConstraints::prefix("ab"), fx.config(&script)).unwrap();

        let (outcome, events) = run_collect(session).await;
        let result = outcome.unwrap();

        assert_eq!(result.pubkey, fx.pubkey);
        assert_eq!(decode_private_key(&result.private_key).unwrap(), fx.keypair_bytes);
        assert_eq!(count_logs(&events), 2);
        assert_eq!(events.last(), Some(&StreamEvent::from(result)));
        assert!(fx.work_root_is_empty());
    }

    #[tokio::test]
    async fn test_garbled_output_before_result() {
        let fx = Fixture::new();
        let script = format!(
            r"printf 'Searching \377\n'; printf '%s' '{json}' > {pk}.json; echo 'Wrote keypair to {pk}.json'",
            json = fx.keypair_json,
            pk = fx.pubkey
        );
        let session = GrindSession::new(SearchConstraints::prefix("ab"), fx.config(&script)).unwrap();

        let (outcome, events) = run_collect(session).await;
        let result = outcome.unwrap();

        assert_eq!(result.pubkey, fx.pubkey);
        assert_eq!(events[0], StreamEvent::log("Searching \u{FFFD}"));
        assert!(fx.work_root_is_empty());
    }

    #[tokio::test]
    async fn test_inline_success() {
        let fx = Fixture::new();
        let script = format!(
            "echo 'pubkey: {pk}'; echo 'private key: {json}'",
            pk = fx.pubkey,
            json = fx.keypair_json
        );
        let session = GrindSession::new(SearchConstraints::suffix("z"), fx.config(&script)).unwrap();

        let (outcome, events) = run_collect(session).await;
        let result = outcome.unwrap();
        assert_eq!(result.pubkey, fx.pubkey);
        assert_eq!(result.private_key, base58_encode(&fx.keypair_bytes));
        assert_eq!(events.last(), Some(&StreamEvent::from(result)));
        assert_eq!(count_logs(&events), events.len() - 1);
    }

    #[tokio::test]
    async fn test_non_zero_exit_has_no_result() {
        let fx = Fixture::new();
        let session = GrindSession::new(
            SearchConstraints::prefix("ab"),
            fx.config("echo one; echo two; echo three; exit 1"),
        )
        .unwrap();

        let (outcome, events) = run_collect(session).await;
        assert!(matches!(outcome, Err(GrindError::ProcessNonZeroExit(_))));
        assert_eq!(count_logs(&events), 3);
        assert_eq!(
            events[..3],
            [
                StreamEvent::log("one"),
                StreamEvent::log("two"),
                StreamEvent::log("three")
            ]
        );
        assert!(matches!(events[3], StreamEvent::Error { .. }));
        assert_eq!(events.len(), 4);
        assert!(!has_result(&events));
    }

    #[tokio::test]
    async fn test_unrecognised_output_has_no_result() {
        let fx = Fixture::new();
        let session = GrindSession::new(
            SearchConstraints::prefix("ab"),
            fx.config("echo 'nothing useful here'"),
        )
        .unwrap();

        let (outcome, events) = run_collect(session).await;
        assert!(matches!(outcome, Err(GrindError::ResultNotFound)));
        assert!(!has_result(&events));
    }

    #[tokio::test]
    async fn test_mismatched_pubkey_is_rejected() {
        let fx = Fixture::new();
        let script = format!(
            "echo 'pubkey: SomeoneElse'; echo 'private key: {json}'",
            json = fx.keypair_json
        );
        let session = GrindSession::new(SearchConstraints::prefix("ab"), fx.config(&script)).unwrap();

        let (outcome, events) = run_collect(session).await;
        assert!(matches!(outcome, Err(GrindError::PubkeyMismatch { .. })));
        assert!(!has_result(&events));
    }

    #[tokio::test]
    async fn test_bad_key_file_is_still_deleted() {
        let fx = Fixture::new();
        let script = format!(
            "printf 'garbage' > {pk}.json; cp {pk}.json {root}/observed; echo 'Wrote keypair to {pk}.json'",
            pk = fx.pubkey,
            root = fx.work_root.path().display()
        );
        let session = GrindSession::new(SearchConstraints::prefix("ab"), fx.config(&script)).unwrap();

        let (outcome, _) = run_collect(session).await;
        assert!(matches!(outcome, Err(GrindError::KeyFileRead { .. })));
        // Only the copy made by the script survives
        let names: Vec<_> = std::fs::read_dir(fx.work_root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("observed")]);
    }

    #[tokio::test]
    async fn test_spawn_failure_ends_stream() {
        let fx = Fixture::new();
        let mut config = fx.config("");
        config.keygen = ToolCommand::new("/nonexistent/solana-keygen");
        let session = GrindSession::new(SearchConstraints::prefix("ab"), config).unwrap();

        let (outcome, events) = run_collect(session).await;
        assert!(matches!(outcome, Err(GrindError::ProcessSpawn { .. })));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_rejects_before_spawning() {
        let fx = Fixture::new();
        let marker = fx.work_root.path().join("spawned");
        let script = format!("touch {}", marker.display());

        let result = GrindSession::new(SearchConstraints::prefix("ab").with_count(0), fx.config(&script));
        let error = result.err().unwrap();
        assert!(error.is_rejection());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_disconnect_kills_grinder() {
        let fx = Fixture::new();
        let pid_file = fx.work_root.path().join("pid");
        let script = format!("echo $$ > {}; echo started; exec sleep 30", pid_file.display());
        let session = GrindSession::new(SearchConstraints::prefix("ab"), fx.config(&script)).unwrap();

        let (tx, mut rx) = mpsc::channel(4);
        let handle = tokio::spawn(session.run(tx));

        assert_eq!(rx.recv().await, Some(StreamEvent::log("started")));
        drop(rx);

        let outcome = tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("session should stop after disconnect")
            .unwrap();
        assert!(matches!(outcome, Err(GrindError::Disconnected)));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let alive = std::process::Command::new("sh")
            .args(["-c", &format!("kill -0 {}", pid.trim())])
            .status()
            .unwrap()
            .success();
        assert!(!alive);
    }

    #[tokio::test]
    async fn test_runtime_limit() {
        let fx = Fixture::new();
        let mut config = fx.config("echo started; exec sleep 30");
        config.max_runtime_secs = 1;
        let session = GrindSession::new(SearchConstraints::prefix("ab"), config).unwrap();

        let (outcome, events) = tokio::time::timeout(Duration::from_secs(10), run_collect(session))
            .await
            .expect("runtime limit should stop the grinder");
        assert!(matches!(outcome, Err(GrindError::TimedOut(1))));
        assert_eq!(events.first(), Some(&StreamEvent::log("started")));
        assert!(matches!(events.last(), Some(StreamEvent::Error { .. })));
    }
}
