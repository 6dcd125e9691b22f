use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use netsync::inbox::{self, InboxReceiver};
use netsync::{LinkEvent, Role, SyncSession};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod driver;
mod link;
mod summary;

use config::SimConfig;
use link::{LinkFaults, LossyLink};
use summary::{EventCounts, PeerSummary, Summary};

#[derive(Parser)]
#[command(
    name = "race-sim",
    version,
    about = "Deterministic two-peer race over a lossy link"
)]
struct Cli {
    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 3600)]
    frames: u32,
    /// RNG seed for deterministic results.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Percent of packets the link loses.
    #[arg(long, default_value_t = 5)]
    drop_percent: u32,
    /// Percent of packets with a flipped bit.
    #[arg(long, default_value_t = 0)]
    corrupt_percent: u32,
    /// Link delay in frames.
    #[arg(long, default_value_t = 2)]
    delay_frames: u32,
    /// Extra random delay, up to this many frames.
    #[arg(long, default_value_t = 1)]
    jitter_frames: u32,
    /// Send a game-state packet every this many frames.
    #[arg(long, default_value_t = 6)]
    state_every: u32,
    /// Drop and re-establish the link at this frame.
    #[arg(long)]
    disconnect_at: Option<u32>,
    /// Optional JSON file with physics, sync and track settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for captures and the summary.
    #[arg(long, default_value = "captures")]
    out_dir: PathBuf,
    /// Write every packet sent to `<out-dir>/packets`.
    #[arg(long)]
    capture: bool,
    /// Fail if the peers diverged more often than this.
    #[arg(long)]
    max_divergences: Option<u64>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create output dir {}", cli.out_dir.display()))?;
    let capture_dir = cli.out_dir.join("packets");
    if cli.capture {
        fs::create_dir_all(&capture_dir)
            .with_context(|| format!("create capture dir {}", capture_dir.display()))?;
    }
    let mut capture = Capture {
        dir: cli.capture.then_some(capture_dir),
        count: 0,
    };

    let faults = LinkFaults {
        drop_percent: cli.drop_percent,
        corrupt_percent: cli.corrupt_percent,
        delay_frames: cli.delay_frames,
        jitter_frames: cli.jitter_frames,
    };
    let mut rng = Rng::new(cli.seed);
    let (host_tx, host_rx) = inbox::channel(config.sync.inbox_capacity);
    let (client_tx, client_rx) = inbox::channel(config.sync.inbox_capacity);
    let mut host = Peer::new(&config, Role::Host, host_rx);
    let mut client = Peer::new(&config, Role::Client, client_rx);
    let mut to_host = LossyLink::new(faults, host_tx);
    let mut to_client = LossyLink::new(faults, client_tx);

    to_host.notify(LinkEvent::Connected { role: Role::Host });
    to_client.notify(LinkEvent::Connected { role: Role::Client });

    info!(
        frames = cli.frames,
        seed = cli.seed,
        drop_percent = cli.drop_percent,
        delay_frames = cli.delay_frames,
        "starting race"
    );

    let mut frames_run = 0;
    let mut frames_in_sync = 0;
    let mut max_view_gap = 0.0f64;
    for step in 0..cli.frames {
        let now = step.wrapping_mul(16) as u16;
        if cli.disconnect_at == Some(step) {
            warn!(frame = step, "dropping link");
            for (link, role) in [(&mut to_host, Role::Host), (&mut to_client, Role::Client)] {
                link.notify(LinkEvent::Disconnected);
                link.notify(LinkEvent::Connected { role });
            }
        }

        host.drain(now);
        client.drain(now);

        let send_state = cli.state_every > 0 && step % cli.state_every == 0;
        host.send(step, now, send_state, &mut to_client, &mut rng, &mut capture)?;
        client.send(step, now, send_state, &mut to_host, &mut rng, &mut capture)?;

        host.tick();
        client.tick();
        to_host.deliver(step);
        to_client.deliver(step);
        frames_run = step + 1;

        let (host_world, client_world) = (host.session.world(), client.session.world());
        if host_world.state_hash() == client_world.state_hash() {
            frames_in_sync += 1;
        }
        for (a, b) in host_world.cars().iter().zip(client_world.cars()) {
            max_view_gap = max_view_gap.max(a.position.distance(b.position).to_f64());
        }
        if host_world.all_finished() && client_world.all_finished() {
            info!(frame = step, "both peers saw the race finish");
            break;
        }
    }

    let summary = Summary {
        frames: frames_run,
        seed: cli.seed,
        faults,
        state_every: cli.state_every,
        packets_captured: capture.count,
        frames_in_sync,
        finished: host.session.world().all_finished(),
        max_view_gap,
        host: host.summarize(to_host.counters()),
        client: client.summarize(to_client.counters()),
    };
    info!(
        frames = summary.frames,
        frames_in_sync,
        host_diverged = summary.host.events.diverged,
        client_diverged = summary.client.events.diverged,
        max_view_gap,
        "race complete"
    );
    write_summary_json(&cli.out_dir, &summary)?;
    summary.assert_budgets(cli.max_divergences)?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("race_sim=info,netsync=warn,physics=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

struct Capture {
    dir: Option<PathBuf>,
    count: u64,
}

impl Capture {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let path = dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        self.count += 1;
        Ok(())
    }
}

struct Peer {
    session: SyncSession,
    inbox: InboxReceiver,
    events: EventCounts,
    late_input_frames: u32,
}

impl Peer {
    fn new(config: &SimConfig, role: Role, inbox: InboxReceiver) -> Self {
        Self {
            session: SyncSession::new(config.sync, role, config.checkpoints()),
            inbox,
            events: EventCounts::default(),
            late_input_frames: 0,
        }
    }

    fn label(&self) -> &'static str {
        if self.session.role().is_host() {
            "host"
        } else {
            "client"
        }
    }

    fn drain(&mut self, now: u16) {
        for event in self.session.drain_inbox(&self.inbox, now) {
            self.events.record(&event);
        }
    }

    fn send(
        &mut self,
        step: u32,
        now: u16,
        send_state: bool,
        link: &mut LossyLink,
        rng: &mut Rng,
        capture: &mut Capture,
    ) -> Result<()> {
        let controls = driver::drive(&self.session, rng);
        let input = self.session.record_local_input(&controls, now);
        validate_packet(&input)?;
        capture.write(&format!("{step:06}_{}_input.bin", self.label()), &input)?;
        link.send(step, LinkEvent::Input(input), rng);

        if send_state {
            let state = self
                .session
                .pack_game_state(now)
                .context("pack game state")?;
            validate_packet(&state)?;
            capture.write(&format!("{step:06}_{}_state.bin", self.label()), &state)?;
            link.send(step, LinkEvent::GameState(state), rng);
        }
        Ok(())
    }

    fn tick(&mut self) {
        let report = self.session.tick();
        if report.input_late {
            self.late_input_frames += 1;
        }
        for event in &report.events {
            self.events.record(event);
        }
    }

    fn summarize(&self, link_in: link::LinkCounters) -> PeerSummary {
        PeerSummary::new(
            &self.session,
            self.late_input_frames,
            self.inbox.dropped(),
            self.events,
            link_in,
        )
    }
}

fn validate_packet(bytes: &[u8]) -> Result<()> {
    tools::decode_packet(bytes, None, None).context("tools decode")?;
    Ok(())
}

fn write_summary_json(out_dir: &Path, summary: &Summary) -> Result<()> {
    let path = out_dir.join("summary.json");
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Returns `true` with probability `percent / 100`.
    fn percent(&mut self, percent: u32) -> bool {
        percent > 0 && self.next_u32() % 100 < percent
    }
}
