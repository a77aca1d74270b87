// ============================================================================
// scope_gui: live waveform / waterfall viewer (FLTK, no GPU)
// ============================================================================

use fltk::{
    app,
    button::Button,
    draw,
    enums::{Align, Color, ColorDepth, FrameType},
    frame::Frame,
    group::{Pack, PackType},
    image::RgbImage,
    menu::Choice,
    prelude::*,
    window::Window,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::error;

use spectrum_scope::{
    CaptureSource, DeviceSource, RenderFrame, RenderMode, ScopeConfig, Session, SessionState,
    SignalSource, ViewSize, telemetry,
};

const REDRAW_INTERVAL: f64 = 0.04;
const BG_DARK: u32 = 0x1e1e2e;
const WAVE_GREEN: u32 = 0xa6e3a1;

fn mode_from_index(index: i32) -> RenderMode {
    match index {
        1 => RenderMode::Wave,
        2 => RenderMode::Spectrum,
        _ => RenderMode::None,
    }
}

fn draw_frame(frame: &RenderFrame, x: i32, y: i32, w: i32, h: i32) {
    draw::set_draw_color(Color::from_hex(BG_DARK));
    draw::draw_rectf(x, y, w, h);

    match frame {
        RenderFrame::Blank => {}
        RenderFrame::Wave(points) => {
            draw::set_draw_color(Color::from_hex(WAVE_GREEN));
            for line in &points.channels {
                for pair in line.windows(2) {
                    draw::draw_line(
                        x + pair[0].x as i32,
                        y + pair[0].y as i32,
                        x + pair[1].x as i32,
                        y + pair[1].y as i32,
                    );
                }
            }
        }
        RenderFrame::Spectrum(image) => {
            let bytes = image.to_rgb_bytes();
            match RgbImage::new(&bytes, image.width() as i32, image.height() as i32, ColorDepth::Rgb8) {
                Ok(mut img) => {
                    img.scale(w, h, false, true);
                    img.draw(x, y, w, h);
                }
                Err(e) => error!("Failed to create waterfall image: {:?}", e),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ScopeConfig::from_env()?;
    let source: Box<dyn CaptureSource> = match std::env::var("SCOPE_SOURCE").ok().as_deref() {
        Some("synthetic") => Box::new(SignalSource::default()),
        _ => Box::new(DeviceSource::new()),
    };
    let (view_w, view_h) = (config.image_width as i32, config.image_height as i32 * 4);
    let session = Rc::new(RefCell::new(Session::new(config, source)?));
    let mode = Rc::new(Cell::new(RenderMode::None));

    let a = app::App::default();
    let mut win = Window::new(100, 100, view_w + 20, view_h + 60, "Spectrum Scope");

    let mut controls = Pack::new(10, 10, view_w, 30, None).with_type(PackType::Horizontal);
    controls.set_spacing(8);
    let mut btn_start = Button::default().with_size(80, 30).with_label("Start");
    let mut btn_stop = Button::default().with_size(80, 30).with_label("Stop");
    let mut mode_choice = Choice::default().with_size(110, 30);
    mode_choice.add_choice("None|Wave|Spectrum");
    mode_choice.set_value(0);
    let mut status = Frame::default().with_size(300, 30).with_label("Idle");
    status.set_align(Align::Inside | Align::Left);
    controls.end();

    let mut display = Frame::new(10, 50, view_w, view_h, None);
    display.set_frame(FrameType::DownBox);

    win.end();
    win.make_resizable(true);
    win.show();

    {
        let session = session.clone();
        let mut status = status.clone();
        btn_start.set_callback(move |_| {
            let result = session.borrow_mut().start();
            match result {
                Ok(()) => status.set_label("Capturing"),
                Err(e) => {
                    error!("{:#}", e);
                    status.set_label(&format!("Start failed: {}", e));
                }
            }
        });
    }
    {
        let session = session.clone();
        let mut status = status.clone();
        btn_stop.set_callback(move |_| {
            session.borrow_mut().stop();
            status.set_label("Idle");
        });
    }
    {
        let mode = mode.clone();
        mode_choice.set_callback(move |c| mode.set(mode_from_index(c.value())));
    }
    {
        let session = session.clone();
        let mode = mode.clone();
        display.draw(move |f| {
            let view = ViewSize::new(f.w() as f32, f.h() as f32);
            let frame = session.borrow().render(mode.get(), view);
            draw_frame(&frame, f.x(), f.y(), f.w(), f.h());
        });
    }

    {
        let session = session.clone();
        let mut display = display.clone();
        let mut status = status.clone();
        app::add_timeout3(REDRAW_INTERVAL, move |handle| {
            if let Ok(mut s) = session.try_borrow_mut() {
                if let Err(e) = s.poll() {
                    error!("{:#}", e);
                    status.set_label(&format!("Stopped: {}", e));
                } else if s.state() == SessionState::Active {
                    let stats = s.stats();
                    status.set_label(&format!("Capturing: {} spectra", stats.frames_extracted));
                }
            }
            display.redraw();
            app::repeat_timeout3(REDRAW_INTERVAL, handle);
        });
    }

    a.run()?;
    session.borrow_mut().stop();
    Ok(())
}
