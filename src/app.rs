use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::collectors::{DashboardFrame, FrameSource, Collectors};
use crate::config::DashboardConfig;
use crate::error::{AppError, Result};
use crate::ui::layout::DashboardLayout;
use crate::ui::output::{self, ColorMode};
use crate::ui::DashboardView;

/// Pending control events before input forwarding waits
const CONTROL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Rendering,
    Sleeping,
    Stopped,
}

/// Requests that reach the controller from outside the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Stop after the cycle in progress
    Quit,
    /// End the current sleep and start the next cycle now
    Refresh,
}

/// Where finished frames go
pub trait Renderer {
    fn draw(&mut self, frame: &DashboardFrame) -> Result<()>;
}

/// Drives the refresh cycle: collect, draw, sleep, repeat.
///
/// Cycles never overlap. A quit request is honored at the top of a cycle or
/// during the sleep, never in the middle of a draw.
pub struct Dashboard<S, R> {
    source: S,
    renderer: R,
    refresh: Duration,
    state: ControllerState,
    draws: usize,
}

impl<S: FrameSource, R: Renderer> Dashboard<S, R> {
    pub fn new(source: S, renderer: R, refresh: Duration) -> Self {
        Self {
            source,
            renderer,
            refresh,
            state: ControllerState::Idle,
            draws: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Frames drawn so far
    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Draw exactly one frame. Never sleeps.
    pub async fn run_once(&mut self) -> Result<()> {
        let result = self.cycle().await;
        self.set_state(ControllerState::Stopped);
        result
    }

    /// Refresh until a quit request arrives or every sender is gone
    pub async fn run_live(&mut self, mut events: mpsc::Receiver<ControlEvent>) -> Result<()> {
        let result = loop {
            match events.try_recv() {
                Ok(ControlEvent::Quit) | Err(mpsc::error::TryRecvError::Disconnected) => break Ok(()),
                Ok(ControlEvent::Refresh) | Err(mpsc::error::TryRecvError::Empty) => {}
            }

            if let Err(err) = self.cycle().await {
                break Err(err);
            }

            self.set_state(ControllerState::Sleeping);
            tokio::select! {
                _ = tokio::time::sleep(self.refresh) => {}
                event = events.recv() => match event {
                    Some(ControlEvent::Refresh) => debug!("refresh requested"),
                    Some(ControlEvent::Quit) | None => break Ok(()),
                },
            }
        };
        self.set_state(ControllerState::Stopped);
        result
    }

    async fn cycle(&mut self) -> Result<()> {
        self.set_state(ControllerState::Rendering);
        let frame = self.source.collect().await;
        self.renderer.draw(&frame)?;
        self.draws += 1;
        Ok(())
    }

    fn set_state(&mut self, state: ControllerState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "controller state");
            self.state = state;
        }
    }
}

/// Live renderer on the alternate screen
pub struct TerminalRenderer {
    terminal: DefaultTerminal,
    layout: DashboardLayout,
    refresh: Duration,
}

impl TerminalRenderer {
    pub fn new(terminal: DefaultTerminal, layout: DashboardLayout, refresh: Duration) -> Self {
        Self {
            terminal,
            layout,
            refresh,
        }
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, frame: &DashboardFrame) -> Result<()> {
        let view = DashboardView {
            layout: &self.layout,
            frame,
            refresh: Some(self.refresh),
        };
        self.terminal
            .draw(|f| f.render_widget(view, f.area()))
            .map_err(|e| {
                warn!(error = %e, "terminal draw failed");
                AppError::display(e.to_string())
            })?;
        Ok(())
    }
}

/// One-shot renderer printing the frame to stdout
pub struct PrintRenderer {
    layout: DashboardLayout,
    size: (u16, u16),
    color: ColorMode,
}

impl PrintRenderer {
    pub fn new(layout: DashboardLayout) -> Self {
        Self {
            layout,
            size: output::canvas_size(),
            color: ColorMode::detect(),
        }
    }
}

impl Renderer for PrintRenderer {
    fn draw(&mut self, frame: &DashboardFrame) -> Result<()> {
        let (width, height) = self.size;
        let buf = output::render_dashboard(&self.layout, frame, width, height);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output::buffer_to_string(&buf, self.color).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Map a terminal event to a control event
pub fn control_event(event: &Event) -> Option<ControlEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(ControlEvent::Quit),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(ControlEvent::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(ControlEvent::Refresh),
            _ => None,
        },
        // Redraw at the new size right away
        Event::Resize(..) => Some(ControlEvent::Refresh),
        _ => None,
    }
}

async fn forward_input(tx: mpsc::Sender<ControlEvent>) {
    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "terminal input closed");
                break;
            }
        };
        if let Some(control) = control_event(&event) {
            if tx.send(control).await.is_err() {
                break;
            }
        }
    }
}

async fn forward_interrupt(tx: mpsc::Sender<ControlEvent>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        let _ = tx.send(ControlEvent::Quit).await;
    }
}

fn terminal_setup_error(err: std::io::Error) -> AppError {
    // Raw mode may already be on when the alternate screen fails
    ratatui::restore();
    AppError::display(format!("could not set up the terminal: {}", err))
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));
}

/// Run the dashboard as configured: a single printed frame, or the live view
/// until the user quits.
pub async fn run_dashboard(config: &DashboardConfig) -> Result<()> {
    if !config.once && !std::io::stdout().is_terminal() {
        return Err(AppError::display(
            "live mode needs an interactive terminal; use --once to print a single frame",
        ));
    }

    let collectors = Collectors::new(&config.project_path, config.disk_root.clone()).await;
    info!(
        path = %config.project_path.display(),
        host_backend = collectors.host_backend(),
        once = config.once,
        refresh_ms = config.refresh.as_millis() as u64,
        "dashboard starting"
    );

    if config.once {
        let mut dashboard = Dashboard::new(collectors, PrintRenderer::new(DashboardLayout::new()), config.refresh);
        return dashboard.run_once().await;
    }

    install_panic_hook();
    let terminal = ratatui::try_init().map_err(terminal_setup_error)?;
    let (tx, rx) = mpsc::channel(CONTROL_CAPACITY);
    let input = tokio::spawn(forward_input(tx.clone()));
    let interrupt = tokio::spawn(forward_interrupt(tx));

    let renderer = TerminalRenderer::new(terminal, DashboardLayout::new(), config.refresh);
    let mut dashboard = Dashboard::new(collectors, renderer, config.refresh);
    let result = dashboard.run_live(rx).await;

    input.abort();
    interrupt.abort();
    ratatui::restore();
    info!(draws = dashboard.draws(), "dashboard stopped");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use std::future::Future;

    #[derive(Default)]
    struct StaticSource {
        collected: usize,
    }

    impl FrameSource for StaticSource {
        fn collect(&mut self) -> impl Future<Output = DashboardFrame> + Send {
            self.collected += 1;
            std::future::ready(DashboardFrame::default())
        }
    }

    /// Counts draws and sends scripted events after given draw numbers
    struct ScriptedRenderer {
        draws: usize,
        script: Vec<(usize, ControlEvent)>,
        tx: Option<mpsc::Sender<ControlEvent>>,
        fail_on: Option<usize>,
    }

    impl ScriptedRenderer {
        fn new(script: Vec<(usize, ControlEvent)>, tx: Option<mpsc::Sender<ControlEvent>>) -> Self {
            Self {
                draws: 0,
                script,
                tx,
                fail_on: None,
            }
        }
    }

    impl Renderer for ScriptedRenderer {
        fn draw(&mut self, _frame: &DashboardFrame) -> Result<()> {
            self.draws += 1;
            if self.fail_on == Some(self.draws) {
                return Err(AppError::display("terminal gone"));
            }
            if let Some(tx) = &self.tx {
                for (at, event) in &self.script {
                    if *at == self.draws {
                        tx.try_send(*event).unwrap();
                    }
                }
            }
            Ok(())
        }
    }

    async fn bounded<F: Future>(fut: F) -> F::Output {
        tokio::time::timeout(Duration::from_secs(10), fut)
            .await
            .expect("controller did not stop")
    }

    #[tokio::test]
    async fn once_mode_draws_exactly_one_frame() {
        let mut dashboard = Dashboard::new(
            StaticSource::default(),
            ScriptedRenderer::new(Vec::new(), None),
            Duration::from_secs(3600),
        );
        assert_eq!(dashboard.state(), ControllerState::Idle);
        bounded(dashboard.run_once()).await.unwrap();
        assert_eq!(dashboard.draws(), 1);
        assert_eq!(dashboard.renderer().draws, 1);
        assert_eq!(dashboard.source.collected, 1);
        assert_eq!(dashboard.state(), ControllerState::Stopped);
    }

    #[tokio::test]
    async fn live_mode_stops_after_quit() {
        let (tx, rx) = mpsc::channel(CONTROL_CAPACITY);
        let n = 3;
        let renderer = ScriptedRenderer::new(vec![(n, ControlEvent::Quit)], Some(tx));
        let mut dashboard = Dashboard::new(StaticSource::default(), renderer, Duration::from_millis(10));

        bounded(dashboard.run_live(rx)).await.unwrap();
        assert!(dashboard.draws() >= n && dashboard.draws() <= n + 1);
        assert_eq!(dashboard.state(), ControllerState::Stopped);
    }

    #[tokio::test]
    async fn refresh_cuts_the_sleep_short() {
        let (tx, rx) = mpsc::channel(CONTROL_CAPACITY);
        let renderer = ScriptedRenderer::new(
            vec![
                (1, ControlEvent::Refresh),
                (2, ControlEvent::Refresh),
                (3, ControlEvent::Quit),
            ],
            Some(tx),
        );
        // An hour-long interval: only Refresh can get past the first sleep
        let mut dashboard = Dashboard::new(StaticSource::default(), renderer, Duration::from_secs(3600));

        bounded(dashboard.run_live(rx)).await.unwrap();
        assert_eq!(dashboard.draws(), 3);
    }

    #[tokio::test]
    async fn quit_before_start_draws_nothing() {
        let (tx, rx) = mpsc::channel(CONTROL_CAPACITY);
        tx.send(ControlEvent::Quit).await.unwrap();
        let mut dashboard = Dashboard::new(
            StaticSource::default(),
            ScriptedRenderer::new(Vec::new(), None),
            Duration::from_millis(10),
        );
        bounded(dashboard.run_live(rx)).await.unwrap();
        assert_eq!(dashboard.draws(), 0);
        assert_eq!(dashboard.state(), ControllerState::Stopped);
    }

    #[tokio::test]
    async fn closed_channel_stops_loop() {
        let (tx, rx) = mpsc::channel::<ControlEvent>(CONTROL_CAPACITY);
        drop(tx);
        let mut dashboard = Dashboard::new(
            StaticSource::default(),
            ScriptedRenderer::new(Vec::new(), None),
            Duration::from_millis(10),
        );
        bounded(dashboard.run_live(rx)).await.unwrap();
        assert_eq!(dashboard.state(), ControllerState::Stopped);
    }

    #[tokio::test]
    async fn draw_failure_is_fatal() {
        let (_tx, rx) = mpsc::channel(CONTROL_CAPACITY);
        let mut renderer = ScriptedRenderer::new(Vec::new(), None);
        renderer.fail_on = Some(2);
        let mut dashboard = Dashboard::new(StaticSource::default(), renderer, Duration::from_millis(5));

        let err = bounded(dashboard.run_live(rx)).await.unwrap_err();
        assert!(matches!(err, AppError::Display { .. }));
        assert_eq!(dashboard.draws(), 1);
        assert_eq!(dashboard.state(), ControllerState::Stopped);
    }

    #[test]
    fn terminal_setup_failure_is_display_error() {
        let err = terminal_setup_error(std::io::Error::new(std::io::ErrorKind::Other, "no tty"));
        assert!(matches!(err, AppError::Display { .. }));
        assert_eq!(err.to_string(), "Display error: could not set up the terminal: no tty");
    }

    #[test]
    fn keys_map_to_control_events() {
        let key = |code, modifiers| Event::Key(KeyEvent::new(code, modifiers));
        assert_eq!(
            control_event(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(ControlEvent::Quit)
        );
        assert_eq!(control_event(&key(KeyCode::Esc, KeyModifiers::NONE)), Some(ControlEvent::Quit));
        assert_eq!(
            control_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ControlEvent::Quit)
        );
        assert_eq!(
            control_event(&key(KeyCode::Char('r'), KeyModifiers::NONE)),
            Some(ControlEvent::Refresh)
        );
        assert_eq!(control_event(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
        assert_eq!(control_event(&Event::Resize(80, 24)), Some(ControlEvent::Refresh));
        assert_eq!(control_event(&Event::FocusGained), None);
    }
}
