//! The terminal dashboard.

use std::{
    io::{Stdout, stdout},
    panic::{self, PanicHookInfo},
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind, poll, read},
    execute,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use tui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
};

use crate::{
    SensorHub,
    event::{DashboardEvent, KeyAction, SamplerCommand, handle_key_event},
    history::HistoryBuffer,
    info::{
        CpuInfo, DiskInfo, DisksInfo, MemInfo, NetworkInterfaceInfo, NetworkInterfacesInfo,
        PartitionInfo,
    },
    options::ViewSelection,
    utils::cancellation_token::CancellationToken,
};

/// How long the input thread waits for a terminal event before checking for
/// cancellation again.
const INPUT_POLL: Duration = Duration::from_millis(20);

/// Returns the newest `width` values of a history column, for a sparkline.
pub fn sparkline_points(history: &HistoryBuffer, col: usize, width: usize) -> Vec<u64> {
    let skip = history.row_count().saturating_sub(width);
    history
        .column(col)
        .skip(skip)
        .map(|value| value.max(0.0).round() as u64)
        .collect()
}

/// Names the aggregate identity for display.
fn unit_label<'a>(name: &'a str, all: &'a str) -> &'a str {
    if name.is_empty() { all } else { name }
}

/// Every view the dashboard shows.
pub struct Dashboard {
    cpu: CpuInfo,
    mem: MemInfo,
    disks: DisksInfo,
    disk: DiskInfo,
    partition: PartitionInfo,
    interfaces: NetworkInterfacesInfo,
    network: NetworkInterfaceInfo,
}

impl Dashboard {
    pub fn new(hub: &SensorHub, view: &ViewSelection) -> Self {
        let mut cpu = CpuInfo::new(hub);
        cpu.set_cpu(view.core);

        let mut disk = DiskInfo::new(hub);
        disk.set_disk(view.disk.as_str());

        let mut partition = PartitionInfo::new(hub);
        partition.set_path(view.partition.as_str());

        let mut network = NetworkInterfaceInfo::new(hub);
        network.set_name(view.interface.as_str());

        Self {
            cpu,
            mem: MemInfo::new(hub),
            disks: DisksInfo::new(hub),
            disk,
            partition,
            interfaces: NetworkInterfacesInfo::new(hub),
            network,
        }
    }

    /// Pulls pending events into every view. Returns whether anything changed.
    pub fn sync(&mut self) -> bool {
        let changes = [
            self.cpu.sync(),
            self.mem.sync(),
            self.disks.sync(),
            self.disk.sync(),
            self.partition.sync(),
            self.interfaces.sync(),
            self.network.sync(),
        ];
        changes.contains(&true)
    }

    pub fn draw(&self, f: &mut Frame<'_>) {
        let [cpu, mem, disk, partition, network] = Layout::vertical([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(f.area());

        self.draw_cpu(f, cpu);
        self.draw_mem(f, mem);
        self.draw_disk(f, disk);
        self.draw_partition(f, partition);
        self.draw_network(f, network);
    }

    fn draw_cpu(&self, f: &mut Frame<'_>, area: Rect) {
        let core = self.cpu.cpu.value();
        let title = if core == 0 {
            format!(" CPU (average of {}) ", self.cpu.nof_cpu.value())
        } else {
            format!(" CPU {core} of {} ", self.cpu.nof_cpu.value())
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let [gauge, graph] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

        let label = format!(
            "user {:.1}%  system {:.1}%  {} processes",
            self.cpu.percent.value(),
            self.cpu.percent_sys.value(),
            self.cpu.nof_proc.value()
        );
        f.render_widget(percent_gauge(self.cpu.percent.value(), label), gauge);

        let points = sparkline_points(&self.cpu.cpu_history, 1, graph.width.into());
        f.render_widget(
            Sparkline::default()
                .data(points)
                .max(100)
                .style(Style::default().fg(Color::Cyan)),
            graph,
        );
    }

    fn draw_mem(&self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Memory ");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let [gauge, graph] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

        let label = format!(
            "{:.1}% used  {} available  swap {:.1}%",
            self.mem.vmem_percent.value(),
            self.mem.vmem_avail_text.get(),
            self.mem.swapmem_percent.value()
        );
        f.render_widget(percent_gauge(self.mem.vmem_percent.value(), label), gauge);

        let points = match self.mem.history.read() {
            Ok(history) => sparkline_points(&history, 1, graph.width.into()),
            Err(_) => Vec::new(),
        };
        f.render_widget(
            Sparkline::default()
                .data(points)
                .max(100)
                .style(Style::default().fg(Color::Magenta)),
            graph,
        );
    }

    fn draw_disk(&self, f: &mut Frame<'_>, area: Rect) {
        let title = format!(
            " Disk I/O: {} ({} disks) ",
            unit_label(self.disk.disk.get(), "all"),
            self.disks.nof_disks.value()
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let label = format!(
            "read {}  write {}{}",
            self.disk.read_text.get(),
            self.disk.write_text.get(),
            if self.disk.is_busy.value() { "  busy" } else { "" }
        );
        draw_rate_pair(f, inner, label, &self.disk.history, Color::Yellow);
    }

    fn draw_partition(&self, f: &mut Frame<'_>, area: Rect) {
        let title = format!(
            " Partition: {} on {} ",
            self.partition.path().get(),
            unit_label(self.partition.disk.get(), "unknown device")
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.partition.avail.value() {
            let label = format!(
                "{:.1}% used  {} free",
                self.partition.percent.value(),
                self.partition.free_text.get()
            );
            f.render_widget(percent_gauge(self.partition.percent.value(), label), inner);
        } else {
            f.render_widget(Paragraph::new("unavailable"), inner);
        }
    }

    fn draw_network(&self, f: &mut Frame<'_>, area: Rect) {
        let name = self.network.name.get();
        let state = if name.is_empty() {
            ""
        } else if self.network.is_up.value() {
            " up"
        } else {
            " down"
        };
        let title = format!(
            " Network: {}{state} ({} interfaces) ",
            unit_label(name, "all"),
            self.interfaces.interfaces.get().len()
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let label = format!(
            "recv {}  sent {}",
            self.network.recv_text.get(),
            self.network.sent_text.get()
        );
        draw_rate_pair(f, inner, label, &self.network.history, Color::Green);
    }
}

fn percent_gauge(percent: f64, label: String) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label)
}

/// A text line over two side-by-side sparklines of a two-column rate history.
fn draw_rate_pair(
    f: &mut Frame<'_>, area: Rect, label: String, history: &HistoryBuffer, color: Color,
) {
    let [text, graphs] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
    f.render_widget(Paragraph::new(Line::from(label)), text);

    let [first, second] =
        Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)]).areas(graphs);
    for (col, area) in [(1, first), (2, second)] {
        let points = sparkline_points(history, col, area.width.into());
        f.render_widget(
            Sparkline::default()
                .data(points)
                .style(Style::default().fg(color)),
            area,
        );
    }
}

pub fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

/// Restores the terminal before printing the panic, so the message stays readable.
pub fn panic_hook(panic_info: &PanicHookInfo<'_>) {
    let mut stdout = stdout();

    let msg = match panic_info.payload().downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match panic_info.payload().downcast_ref::<String>() {
            Some(s) => &s[..],
            None => "Box<Any>",
        },
    };

    let stacktrace = format!("{:?}", backtrace::Backtrace::new());

    let _ = disable_raw_mode();
    let _ = execute!(stdout, LeaveAlternateScreen);

    // Print stack trace. Must be done after leaving the alternate screen.
    let location = panic_info
        .location()
        .map(|location| location.to_string())
        .unwrap_or_default();
    let _ = execute!(
        stdout,
        Print(format!(
            "thread '<unnamed>' panicked at '{msg}', {location}\n\r{stacktrace}"
        )),
    );
}

/// Forwards key presses and resizes to `sender` until `token` is cancelled.
pub fn create_input_thread(
    sender: Sender<DashboardEvent>, token: Arc<CancellationToken>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !token.is_cancelled() {
            if let Ok(true) = poll(INPUT_POLL) {
                let event = match read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        DashboardEvent::KeyInput(key)
                    }
                    Ok(Event::Resize(_, _)) => DashboardEvent::Resize,
                    _ => continue,
                };

                if sender.send(event).is_err() {
                    break;
                }
            }
        }
    })
}

/// Draws the dashboard until the user quits.
pub fn run_dashboard(hub: &SensorHub, view: &ViewSelection, redraw: Duration) -> Result<()> {
    let mut dashboard = Dashboard::new(hub, view);

    let token = Arc::new(CancellationToken::default());
    let (sender, receiver) = mpsc::channel();
    let input_thread = create_input_thread(sender.clone(), token.clone());

    ctrlc::set_handler(move || {
        let _ = sender.send(DashboardEvent::Terminate);
    })?;

    let mut stdout_val = stdout();
    execute!(stdout_val, EnterAlternateScreen)?;
    enable_raw_mode()?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout_val))?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    panic::set_hook(Box::new(|info| panic_hook(info)));

    info!("Dashboard: started");

    let result = (|| -> Result<()> {
        loop {
            match receiver.recv_timeout(redraw) {
                Ok(DashboardEvent::KeyInput(key)) => match handle_key_event(key) {
                    KeyAction::Quit => break,
                    KeyAction::Reset => {
                        debug!("Dashboard: reset requested");
                        hub.send(SamplerCommand::Reset);
                    }
                    KeyAction::Ignore => {}
                },
                Ok(DashboardEvent::Resize) | Err(RecvTimeoutError::Timeout) => {}
                Ok(DashboardEvent::Terminate) | Err(RecvTimeoutError::Disconnected) => break,
            }

            dashboard.sync();
            terminal.draw(|f| dashboard.draw(f))?;
        }
        Ok(())
    })();

    token.cancel();
    let _ = input_thread.join();
    cleanup_terminal(&mut terminal)?;

    info!("Dashboard: stopped");

    result
}
