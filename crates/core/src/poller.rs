//! The enumerate / acquire / call / release polling loop.

use std::time::Duration;

use devbridge_protocol::Message;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::DeviceBridge;
use crate::error::{Error, Result};
use crate::session::{Session, SessionClient};

/// What the poller does when a device cycle or an enumeration fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
	/// Log the failure, count it, and move on to the next device.
	#[default]
	Skip,
	/// Stop polling and return the failure.
	Abort,
}

/// Poller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
	/// Pause between iterations in milliseconds; `0` polls back to back.
	pub interval_ms: u64,
	/// Stop after this many iterations. `None` polls until stopped.
	pub max_iterations: Option<u64>,
	pub on_error: FailurePolicy,
	/// Hex-encoded message frame sent to every device.
	pub payload: String,
}

impl Default for PollConfig {
	fn default() -> Self {
		Self {
			interval_ms: 1000,
			max_iterations: None,
			on_error: FailurePolicy::Skip,
			payload: Message::initialize().to_hex(),
		}
	}
}

/// Step of a device cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
	Enumerate,
	Acquire,
	Call,
	Release,
}

/// A failure recorded under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
	/// Device path; empty for enumeration failures.
	pub path: String,
	pub stage: Stage,
	pub error: String,
}

/// Outcome of one iteration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
	pub iteration: u64,
	/// Devices returned by the enumeration.
	pub devices: usize,
	/// Devices that completed acquire, call, and release.
	pub completed: usize,
	pub failures: Vec<Failure>,
	/// Set when the stop signal cut the iteration short.
	pub interrupted: bool,
}

/// Totals over a whole [`Poller::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
	pub iterations: u64,
	pub completed: usize,
	pub failures: usize,
}

/// Repeatedly enumerates devices and runs one acquire, call, release cycle
/// on each, strictly one device at a time.
pub struct Poller<B> {
	client: SessionClient<B>,
	config: PollConfig,
	payload: Message,
	/// Sessions whose release failed; retried every iteration and on exit.
	unreleased: Vec<Session>,
}

impl<B: DeviceBridge> Poller<B> {
	pub fn new(bridge: B, config: PollConfig) -> Result<Self> {
		let payload = Message::from_hex(&config.payload)?;
		Ok(Self {
			client: SessionClient::new(bridge),
			config,
			payload,
			unreleased: Vec::new(),
		})
	}

	pub fn client(&self) -> &SessionClient<B> {
		&self.client
	}

	/// Polls until `stop` turns `true` or the iteration limit is reached.
	///
	/// The stop signal is checked before every enumeration and between
	/// devices; a device whose session is already acquired always finishes
	/// its cycle. Sessions whose release failed are released once more
	/// before returning, whatever the outcome.
	pub async fn run(&mut self, stop: watch::Receiver<bool>) -> Result<RunSummary> {
		let result = self.run_loop(stop).await;
		self.retry_releases().await;
		result
	}

	async fn run_loop(&mut self, mut stop: watch::Receiver<bool>) -> Result<RunSummary> {
		let mut summary = RunSummary::default();

		loop {
			if self.limit_reached(summary.iterations) {
				debug!(iterations = summary.iterations, "iteration limit reached");
				break;
			}
			if *stop.borrow() {
				info!(iterations = summary.iterations, "stop requested");
				break;
			}

			let report = self.poll_once(summary.iterations + 1, &stop).await?;
			summary.iterations = report.iteration;
			summary.completed += report.completed;
			summary.failures += report.failures.len();

			if self.limit_reached(summary.iterations) {
				debug!(iterations = summary.iterations, "iteration limit reached");
				break;
			}
			if report.interrupted || self.pause(&mut stop).await {
				info!(iterations = summary.iterations, "stop requested");
				break;
			}
		}

		Ok(summary)
	}

	fn limit_reached(&self, iterations: u64) -> bool {
		self.config.max_iterations.is_some_and(|max| iterations >= max)
	}

	/// Runs one iteration: enumerate, then cycle through every device.
	pub async fn poll_once(&mut self, iteration: u64, stop: &watch::Receiver<bool>) -> Result<CycleReport> {
		let mut report = CycleReport {
			iteration,
			..Default::default()
		};

		let devices = match self.client.enumerate().await {
			Ok(devices) => devices,
			Err(err) => {
				self.handle_failure(&mut report, "", Stage::Enumerate, err)?;
				return Ok(report);
			}
		};
		report.devices = devices.len();
		debug!(iteration, devices = devices.len(), "enumerated");

		// Frees devices left held by an earlier failed release before they
		// come up for their own cycle.
		self.retry_releases().await;

		for device in &devices {
			if *stop.borrow() {
				report.interrupted = true;
				break;
			}

			match self.cycle(&device.path).await {
				Ok(reply) => {
					debug!(path = %device.path, kind = reply.kind, len = reply.data.len(), "device answered");
					report.completed += 1;
				}
				Err((stage, err)) => self.handle_failure(&mut report, &device.path, stage, err)?,
			}
		}

		info!(
			iteration,
			devices = report.devices,
			completed = report.completed,
			failures = report.failures.len(),
			"poll iteration finished"
		);
		Ok(report)
	}

	/// Acquire, call, release. Release is attempted even when the call fails.
	async fn cycle(&mut self, path: &str) -> std::result::Result<Message, (Stage, Error)> {
		let session = self.client.acquire(path).await.map_err(|e| (Stage::Acquire, e))?;
		let reply = match self.client.send(&session, &self.payload).await {
			// Stale sessions are already dropped by the client; nothing to release.
			Err(err) if err.is_session() => return Err((Stage::Call, err)),
			reply => reply,
		};

		let released = self.client.release(&session).await;
		if let Err(ref err) = released {
			// A stale session is already dropped by the client; anything else
			// leaves the device held until the release goes through.
			if !err.is_session() {
				self.unreleased.push(session);
			}
		}

		match (reply, released) {
			(Ok(reply), Ok(())) => Ok(reply),
			(Err(err), Ok(())) => Err((Stage::Call, err)),
			(Err(err), Err(release_err)) => {
				warn!(path, error = %release_err, "release after failed call also failed");
				Err((Stage::Call, err))
			}
			(Ok(_), Err(err)) => Err((Stage::Release, err)),
		}
	}

	/// Retries every release that failed earlier. Sessions the bridge no
	/// longer knows are forgotten; the rest stay queued.
	async fn retry_releases(&mut self) {
		for session in std::mem::take(&mut self.unreleased) {
			match self.client.release(&session).await {
				Ok(()) => debug!(path = session.path(), session = session.token(), "released on retry"),
				Err(err) if err.is_session() => {
					debug!(path = session.path(), session = session.token(), "session gone before retry")
				}
				Err(err) => {
					warn!(path = session.path(), session = session.token(), error = %err, "release retry failed");
					self.unreleased.push(session);
				}
			}
		}
	}

	fn handle_failure(&self, report: &mut CycleReport, path: &str, stage: Stage, err: Error) -> Result<()> {
		if self.config.on_error == FailurePolicy::Abort {
			return Err(err);
		}

		warn!(path, ?stage, error = %err, "skipping after failure");
		report.failures.push(Failure {
			path: path.to_string(),
			stage,
			error: err.to_string(),
		});
		Ok(())
	}

	/// Sleeps for the poll interval; returns `true` if stop was requested meanwhile.
	async fn pause(&self, stop: &mut watch::Receiver<bool>) -> bool {
		let sleep = tokio::time::sleep(Duration::from_millis(self.config.interval_ms));
		tokio::pin!(sleep);

		loop {
			tokio::select! {
				_ = &mut sleep => return false,
				changed = stop.changed() => {
					if changed.is_err() {
						// Sender gone: nobody can ask us to stop any more.
						(&mut sleep).await;
						return false;
					}
					if *stop.borrow_and_update() {
						return true;
					}
				}
			}
		}
	}
}
