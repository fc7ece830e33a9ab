//! Result surface: exactly one of four views, chosen from orchestrator state.
use maud::{html, Markup};

use crate::generation::DOWNLOAD_FILE_NAME;
use crate::state::Orchestrator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView<'a> {
    Loading,
    Error(&'a str),
    Icon { src: &'a str, download_name: &'static str },
    Placeholder,
}

impl<'a> ResultView<'a> {
    /// Loading wins over error, error over result, result over placeholder.
    pub fn from_state(state: &'a Orchestrator) -> Self {
        if state.is_in_flight() {
            ResultView::Loading
        } else if let Some(message) = state.error() {
            ResultView::Error(message)
        } else if let Some(icon) = state.result() {
            ResultView::Icon { src: icon.data_url(), download_name: DOWNLOAD_FILE_NAME }
        } else {
            ResultView::Placeholder
        }
    }

    pub fn render(&self) -> Markup {
        match self {
            ResultView::Loading => html! {
                div class="result loading" role="status" {
                    div class="spinner" {}
                    p { "Generating your icon..." }
                }
            },
            ResultView::Error(message) => html! {
                div class="result error" role="alert" {
                    p class="title" { "Generation failed" }
                    p class="message" { (message) }
                }
            },
            ResultView::Icon { src, download_name } => html! {
                div class="result icon" {
                    img src=(src) alt="Generated icon";
                    a class="download" href=(src) download=(download_name) { "Download" }
                }
            },
            ResultView::Placeholder => html! {
                div class="result placeholder" {
                    p { "Your generated icon will appear here." }
                }
            },
        }
    }
}
