use crate::provider::EnrolProvider;
use crate::theme::Theme;

type LaunchHook = Box<dyn FnOnce(&mut gpui::App, &EnrolProvider) + 'static>;

/// Thin wrapper over `gpui::Application` that installs the provider before
/// the embedder's launch callback runs.
pub struct EnrolApplication {
    application: gpui::Application,
    provider: EnrolProvider,
    launch_hooks: Vec<LaunchHook>,
}

impl Default for EnrolApplication {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrolApplication {
    pub fn new() -> Self {
        Self {
            application: gpui::Application::new(),
            provider: EnrolProvider::new(),
            launch_hooks: Vec::new(),
        }
    }

    pub fn headless() -> Self {
        Self {
            application: gpui::Application::headless(),
            provider: EnrolProvider::new(),
            launch_hooks: Vec::new(),
        }
    }

    pub fn application(&self) -> &gpui::Application {
        &self.application
    }

    pub fn with_provider(mut self, provider: EnrolProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn set_theme(mut self, theme: Theme) -> Self {
        self.provider = self.provider.set_theme(|_| theme);
        self
    }

    pub fn before_launch(
        mut self,
        hook: impl FnOnce(&mut gpui::App, &EnrolProvider) + 'static,
    ) -> Self {
        self.launch_hooks.push(Box::new(hook));
        self
    }

    pub fn run<F>(self, on_finish_launching: F)
    where
        F: 'static + FnOnce(&mut gpui::App),
    {
        let provider = self.provider;
        let launch_hooks = self.launch_hooks;
        self.application.run(move |cx| {
            provider.clone().install(cx);

            for hook in launch_hooks {
                hook(cx, &provider);
            }

            on_finish_launching(cx);
        });
    }
}
