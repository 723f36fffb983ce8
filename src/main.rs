fn main() -> eframe::Result<()> {
    classlink::init_logging();
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "classlink",
        native_options,
        Box::new(|cc| Ok(Box::new(classlink::app::EditorApp::new(cc)))),
    )
}
