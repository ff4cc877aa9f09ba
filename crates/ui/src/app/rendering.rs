use super::App;
use crate::components::{ChatTabs, ChatView, Footer, Header, Heading, InputBox, MediaView};
use crate::layout::{ConversationLayout, InitialLayout};
use crate::media::MediaKind;
use crate::theme::{Theme, ThemePalette};

use mathcast_core::{Transport, ViewMode};
use ratatui::{Frame, widgets::Block};

pub fn render(app: &App, frame: &mut Frame<'_>) {
    let area = frame.area();
    let palette = Theme::palette(app.vm.theme());
    frame.render_widget(Block::default().style(palette.base()), area);

    match app.vm.mode() {
        ViewMode::Initial => render_initial(app, frame, palette),
        ViewMode::Conversation => render_conversation(app, frame, palette),
    }
}

fn header<'a>(app: &'a App, palette: ThemePalette) -> Header<'a> {
    Header::new(app.vm.sessions(), app.vm.active_session(), &app.state.provider_name, app.vm.theme(), palette)
}

fn footer<'a>(app: &'a App, palette: ThemePalette) -> Footer<'a> {
    Footer::new(app.state.ui.status.as_ref(), app.vm.mode(), app.vm.transport().is_streaming(), palette)
}

fn render_initial(app: &App, frame: &mut Frame<'_>, palette: ThemePalette) {
    let layout = InitialLayout::calculate(frame.area());

    header(app, palette).render(frame, layout.header);
    Heading::new(palette).render(frame, layout.heading);
    InputBox::new(&app.state.input, ViewMode::Initial, palette).render(frame, layout.input);
    footer(app, palette).render(frame, layout.footer);
}

fn render_conversation(app: &App, frame: &mut Frame<'_>, palette: ThemePalette) {
    let layout = ConversationLayout::calculate(frame.area());
    let transport = app.vm.transport();
    let messages = app.vm.active_session().map(|s| s.transcript.as_slice()).unwrap_or_default();

    header(app, palette).render(frame, layout.header);
    ChatTabs::new(app.state.ui.tab, palette).render(frame, layout.tabs);
    ChatView::new(messages, transport.is_streaming(), transport.last_error(), &app.state.ui, palette)
        .render(frame, layout.transcript);
    InputBox::new(&app.state.input, ViewMode::Conversation, palette).render(frame, layout.input);

    if app.vm.panels_visible() {
        let media = MediaView::new(&app.state.media, palette);
        media.render(frame, MediaKind::Video, layout.video);
        media.render(frame, MediaKind::Transcript, layout.media_transcript);
        media.render(frame, MediaKind::Audio, layout.audio);
    }

    footer(app, palette).render(frame, layout.footer);
}
