use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use composition::ShaderParameters;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::window::{Window, WindowBuilder};

use tracing::{error, warn};

use crate::gpu::GpuState;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, FrameScheduler, RenderPolicy, TimeSample};
use crate::types::RendererConfig;

/// Aggregates the surface state for the preview window.
///
/// A failed GPU initialisation leaves `gpu` unset and the window inert: the
/// event loop keeps running, no draw calls are issued, nothing panics.
struct WindowState {
    window: Arc<Window>,
    gpu: Option<GpuState>,
    params: ShaderParameters,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Self {
        let size = window.inner_size();
        let gpu = match GpuState::new(window.as_ref(), size, config.antialiasing) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                error!(
                    "failed to initialise rendering session; preview stays blank: {err:?}"
                );
                None
            }
        };
        Self {
            window,
            gpu,
            params: config.parameters.clone(),
        }
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu
            .as_ref()
            .map(|gpu| gpu.size())
            .unwrap_or_else(|| self.window.inner_size())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(new_size);
        }
    }

    fn set_parameters(&mut self, params: ShaderParameters) {
        self.params = params;
    }

    fn render_frame(&mut self, time_sample: TimeSample) -> Result<(), wgpu::SurfaceError> {
        match self.gpu.as_mut() {
            Some(gpu) => gpu.render(&self.params, time_sample),
            None => Ok(()),
        }
    }
}

struct RenderPolicyDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
}

impl RenderPolicyDriver {
    fn new(policy: RenderPolicy) -> Self {
        Self {
            scheduler: FrameScheduler::new(policy.clone()),
            time_source: time_source_for_policy(&policy),
        }
    }

    fn sample(&mut self) -> TimeSample {
        self.time_source.sample()
    }

    fn mark_rendered(&mut self) {
        self.scheduler.mark_rendered();
    }

    fn ready_for_frame(&mut self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Ask for one more frame without restarting the clock; a parameter
    /// update must not rewind the animation.
    fn request_refresh(&mut self) {
        self.scheduler.request_refresh();
    }
}

#[derive(Debug, Clone)]
enum WindowCommand {
    UpdateParams(ShaderParameters),
    Shutdown,
}

#[derive(Debug, Clone)]
enum WindowSignal {
    Closed,
}

/// Handle to the preview window's event-loop thread.
///
/// `update_params` is the parameter-update interface the editor shell calls
/// into; `shutdown` (also run on drop) is the single cancellation point that
/// stops the frame chain.
pub struct WindowRuntime {
    proxy: EventLoopProxy<WindowCommand>,
    events: Receiver<WindowSignal>,
    join_handle: Option<JoinHandle<Result<()>>>,
}

impl WindowRuntime {
    pub fn spawn(config: RendererConfig) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let (signal_tx, signal_rx) = unbounded();
        let handle = thread::Builder::new()
            .name("shaderforge-window".into())
            .spawn(move || run_window_thread(config, ready_tx, signal_tx))
            .map_err(|err| anyhow!("failed to spawn window thread: {err}"))?;

        let proxy = ready_rx
            .recv()
            .map_err(|err| anyhow!("window thread failed to initialise: {err}"))??;

        Ok(Self {
            proxy,
            events: signal_rx,
            join_handle: Some(handle),
        })
    }

    /// Pushes a fresh parameter snapshot into the render loop.
    pub fn update_params(&self, params: ShaderParameters) -> Result<()> {
        self.proxy
            .send_event(WindowCommand::UpdateParams(params))
            .map_err(|err| anyhow!(err))
    }

    /// Waits up to `timeout` for the window to close. Returns true once the
    /// window is gone (close requested or the loop thread ended).
    pub fn poll_closed(&self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(WindowSignal::Closed) => true,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => false,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => true,
        }
    }

    /// Blocks until the window closes.
    pub fn wait_until_closed(&self) {
        loop {
            match self.events.recv() {
                Ok(WindowSignal::Closed) | Err(_) => return,
            }
        }
    }

    pub fn shutdown(mut self) -> Result<()> {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            handle
                .join()
                .map_err(|err| anyhow!("window thread panicked: {err:?}"))??;
        }
        Ok(())
    }
}

impl Drop for WindowRuntime {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.proxy.send_event(WindowCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run_window_thread(
    config: RendererConfig,
    ready_tx: Sender<Result<EventLoopProxy<WindowCommand>, anyhow::Error>>,
    signal_tx: Sender<WindowSignal>,
) -> Result<()> {
    let mut builder = EventLoopBuilder::<WindowCommand>::with_user_event();
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
    }

    #[cfg(any(
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    }
    let event_loop = builder
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let proxy = event_loop.create_proxy();

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("Shaderforge Preview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window.clone(), &config);
    let mut policy_driver = RenderPolicyDriver::new(config.policy.clone());
    if policy_driver.ready_for_frame(Instant::now()) {
        state.window().request_redraw();
    }

    let _ = ready_tx.send(Ok(proxy.clone()));

    let mut result = Ok(());
    let run_result = event_loop.run(move |event, elwt| {
        match event {
            Event::UserEvent(command) => match command {
                WindowCommand::UpdateParams(params) => {
                    state.set_parameters(params);
                    policy_driver.request_refresh();
                    if policy_driver.ready_for_frame(Instant::now()) {
                        state.window().request_redraw();
                    }
                }
                WindowCommand::Shutdown => {
                    elwt.exit();
                }
            },
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        let _ = signal_tx.send(WindowSignal::Closed);
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.size());
                    }
                    WindowEvent::RedrawRequested => {
                        match state.render_frame(policy_driver.sample()) {
                            Ok(()) => policy_driver.mark_rendered(),
                            Err(err) => match err {
                                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                                    state.resize(state.size());
                                }
                                wgpu::SurfaceError::OutOfMemory => {
                                    error!("surface out of memory; exiting preview");
                                    let _ = signal_tx.send(WindowSignal::Closed);
                                    elwt.exit();
                                }
                                wgpu::SurfaceError::Timeout => {
                                    warn!("surface timeout; retrying next frame");
                                }
                                other => {
                                    warn!("surface error: {other:?}; retrying next frame");
                                }
                            },
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if policy_driver.ready_for_frame(now) {
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = policy_driver.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        }
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("window event loop error: {err}"));
    }

    result
}
