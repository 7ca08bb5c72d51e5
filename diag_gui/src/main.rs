//! # Lesionscope GUI Application
//!
//! Choose a skin image, preview it, and send it to the ensemble classifier.
//! Built with Iced for native desktops and the browser (WASM).
//!
//! The [`App`] holds a [`Controller`] and forwards every user action and
//! network completion to it; widgets only read its view model.

mod ui;

use iced::widget::image::Handle;
use iced::widget::scrollable::RelativeOffset;
use iced::widget::{column, container, operation, scrollable, Id};
use iced::{Element, Length, Task};

use diag_core::config::{self, Config};
use diag_core::errors::{DiagError, DiagResult};
use diag_core::file::SelectedFile;
use diag_core::state::{Controller, Submission, Ticket};
use diag_core::transport::{HttpTransport, PredictTransport};
use diag_core::view::ScrollTarget;

/// Id of the page-level scrollable, used for scroll-into-view
pub const PAGE_SCROLLABLE: &str = "diagnosis-page";

/// Extensions offered by the file dialog
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

#[derive(Debug, Clone)]
pub enum Message {
    ChooseImage,
    /// `None` when the dialog was dismissed
    ImageChosen(Option<DiagResult<SelectedFile>>),
    Diagnose,
    PredictionReturned(Ticket, DiagResult<Vec<u8>>),
}

pub struct App {
    controller: Controller,
    transport: Result<HttpTransport, DiagError>,
    settings: Config,
    /// Cached GPU handles, rebuilt only when the view model changes
    preview_handle: Option<Handle>,
    explanation_handle: Option<Handle>,
    /// Last selection problem, shown in the status bar
    notice: Option<String>,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let (settings, warning) = config::load();
        diag_core::logging::init(&settings.logging.filter);
        if let Some(warning) = &warning {
            tracing::warn!(%warning, "using default settings");
        }

        let transport = HttpTransport::new(&settings.server.base_url);
        if let Err(e) = &transport {
            tracing::error!(error = %e, "HTTP client unavailable; submissions will fail");
        }

        let app = App {
            controller: Controller::new(),
            transport,
            settings,
            preview_handle: None,
            explanation_handle: None,
            notice: warning,
        };
        (app, Task::none())
    }

    fn title(&self) -> String {
        format!("Lesionscope - {}", self.controller.state().display_name())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ChooseImage => Task::perform(pick_image(), Message::ImageChosen),

            Message::ImageChosen(None) => Task::none(),

            Message::ImageChosen(Some(read)) => match self.controller.select_file(read) {
                Ok(()) => {
                    self.notice = None;
                    self.sync_handles();
                    self.scroll_task()
                }
                Err(e) => {
                    // Previous preview stays; just tell the user why nothing changed
                    self.notice = Some(e.to_string());
                    Task::none()
                }
            },

            Message::Diagnose => match self.controller.begin_submission() {
                Ok(Submission { ticket, file }) => {
                    self.sync_handles();
                    match &self.transport {
                        Ok(transport) => Task::perform(transport.predict(file), move |outcome| {
                            Message::PredictionReturned(ticket, outcome)
                        }),
                        Err(e) => Task::done(Message::PredictionReturned(ticket, Err(e.clone()))),
                    }
                }
                Err(_) => {
                    self.sync_handles();
                    Task::none()
                }
            },

            Message::PredictionReturned(ticket, outcome) => {
                self.controller.finish_submission(ticket, outcome);
                self.sync_handles();
                self.scroll_task()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let page = column![
            ui::toolbar::view_header(),
            ui::toolbar::view_toolbar(self.controller.state()),
            ui::preview_panel::view(self.controller.view(), self.preview_handle.as_ref()),
            ui::results_panel::view_results_panel(self.controller.view(), self.explanation_handle.as_ref()),
        ]
        .spacing(12)
        .padding(16);

        let endpoint = match &self.transport {
            Ok(t) => t.url(),
            Err(_) => self.settings.server.base_url.as_str(),
        };

        column![
            scrollable(page).id(Id::new(PAGE_SCROLLABLE)).height(Length::Fill),
            container(ui::status_bar::view_status_bar(
                self.controller.state(),
                endpoint,
                self.notice.as_deref(),
            ))
            .padding([0, 16]),
        ]
        .into()
    }

    /// Rebuild image handles from the view model after a transition
    fn sync_handles(&mut self) {
        let view = self.controller.view();
        self.preview_handle = view
            .preview
            .as_ref()
            .map(|p| Handle::from_bytes(p.bytes.clone()));
        self.explanation_handle = view
            .explanation
            .as_ref()
            .map(|e| Handle::from_bytes(e.png_bytes.clone()));
    }

    fn scroll_task(&mut self) -> Task<Message> {
        let offset = match self.controller.take_scroll_target() {
            Some(ScrollTarget::Preview) => RelativeOffset::START,
            Some(ScrollTarget::Results) => RelativeOffset::END,
            None => return Task::none(),
        };
        operation::snap_to(Id::new(PAGE_SCROLLABLE), offset)
    }
}

/// Show the file dialog and read the chosen image
async fn pick_image() -> Option<DiagResult<SelectedFile>> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Choose an image")
        .add_filter("Images", &IMAGE_EXTENSIONS)
        .pick_file()
        .await?;

    #[cfg(not(target_arch = "wasm32"))]
    let read = diag_core::file::read_selected_file(handle.path());

    #[cfg(target_arch = "wasm32")]
    let read = Ok(SelectedFile::from_bytes(handle.file_name(), handle.read().await));

    Some(read)
}

fn main() -> iced::Result {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    iced::application(App::new, App::update, App::view)
        .title(App::title)
        .window_size((720.0, 900.0))
        .run()
}
