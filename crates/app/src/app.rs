use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log target for client bootstrap and frame loop messages.
pub const LOG_CLIENT: &str = "client";
/// Log target for the synchronization session (snapshot, joins, leaves).
pub const LOG_SYNC: &str = "client::sync";
/// Log target for world setup (bounds, spawn placement).
pub const LOG_WORLD: &str = "client::world";

/// Application infrastructure context.
///
/// Contains identity, version info, and logging infrastructure.
/// This is the core context that every application needs, regardless of
/// whether it uses Bevy or not.
pub struct AppContext {
    app_id: &'static str,
    version: &'static str,
    log_file: Option<PathBuf>,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.app_id
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    /// Path of the log file, if file logging was requested.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
/// This is a pure marker trait - no logic, just constants.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
}

/// Builder for creating applications with proper initialization.
///
/// Initializes logging, then hands out a `BevyApp<A>` via `build_with_bevy`.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder that logs to the console only.
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        Self::init(version, None)
    }

    /// Create a new application builder that logs to the console and to a
    /// timestamped file inside `log_dir`.
    ///
    /// The directory is created if it does not exist yet.
    pub fn with_log_dir(version: &'static str, log_dir: impl AsRef<Path>) -> Result<Self, BoxError> {
        Self::init(version, Some(log_dir.as_ref()))
    }

    fn init(version: &'static str, log_dir: Option<&Path>) -> Result<Self, BoxError> {
        #[cfg(debug_assertions)]
        let level = LevelFilter::INFO;

        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        let mut log_file = None;
        let mut guard = None;
        let file_layer = match log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let file_name = log_file_name(A::APP_ID);
                log_file = Some(dir.join(&file_name));

                let file_appender = tracing_appender::rolling::never(dir, file_name);
                let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
                guard = Some(worker_guard);

                Some(
                    fmt::Layer::default()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(non_blocking)
                        .with_filter(filter_fn(move |metadata| metadata.level() <= &level)),
                )
            }
            None => None,
        };

        let console_layer = fmt::Layer::default()
            .with_target(true)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()?;

        tracing::info!(
            target: LOG_CLIENT,
            "{} v{} started",
            A::APP_ID,
            version
        );

        Ok(Self {
            context: AppContext {
                app_id: A::APP_ID,
                version,
                log_file,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    /// Build a Bevy-based application.
    ///
    /// The `configure` callback receives the Bevy `App` by value and the `AppContext`,
    /// and must return the configured App. This follows Bevy's builder pattern.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let app = AppBuilder::<MyApp>::new("1.0.0")?
    ///     .build_with_bevy(|app, ctx| {
    ///         app.add_plugins(MinimalPlugins)
    ///            .add_systems(Update, my_system)
    ///     });
    /// ```
    #[cfg(feature = "bevy")]
    pub fn build_with_bevy(
        self,
        configure: impl FnOnce(bevy::prelude::App, &AppContext) -> bevy::prelude::App,
    ) -> BevyApp<A> {
        let bevy_app = bevy::prelude::App::new();
        let configured_app = configure(bevy_app, &self.context);

        BevyApp {
            context: self.context,
            app: configured_app,
            _marker: PhantomData,
        }
    }
}

fn log_file_name(app_id: &str) -> String {
    format!(
        "{app_id}_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Bevy-based application wrapper.
///
/// Contains both the infrastructure context and the Bevy App.
/// The context is kept alive to ensure logging continues working.
#[cfg(feature = "bevy")]
pub struct BevyApp<A: Application> {
    pub context: AppContext,
    pub app: bevy::prelude::App,
    _marker: PhantomData<A>,
}

#[cfg(feature = "bevy")]
impl<A: Application> BevyApp<A> {
    /// Advance the Bevy application by exactly `frames` schedule updates.
    ///
    /// Plugins are finished on the first call, as the default runner would.
    pub fn run_frames(&mut self, frames: usize) {
        if self.app.plugins_state() == bevy::app::PluginsState::Ready {
            self.app.finish();
            self.app.cleanup();
        }
        for _ in 0..frames {
            self.app.update();
        }
    }

    /// Get a reference to the app context.
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// The Bevy world, for reading resources between or after frames.
    pub fn world(&self) -> &bevy::prelude::World {
        self.app.world()
    }
}
