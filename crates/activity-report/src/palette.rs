use plotters::style::RGBColor;

/// Number of distinct series colors.
pub const PALETTE_SIZE: usize = 20;

/// Twenty-color categorical palette: ten hues, each as a dark/light pair.
pub const CATEGORICAL_20: [RGBColor; PALETTE_SIZE] = [
    RGBColor(31, 119, 180),
    RGBColor(174, 199, 232),
    RGBColor(255, 127, 14),
    RGBColor(255, 187, 120),
    RGBColor(44, 160, 44),
    RGBColor(152, 223, 138),
    RGBColor(214, 39, 40),
    RGBColor(255, 152, 150),
    RGBColor(148, 103, 189),
    RGBColor(197, 176, 213),
    RGBColor(140, 86, 75),
    RGBColor(196, 156, 148),
    RGBColor(227, 119, 194),
    RGBColor(247, 182, 210),
    RGBColor(127, 127, 127),
    RGBColor(199, 199, 199),
    RGBColor(188, 189, 34),
    RGBColor(219, 219, 141),
    RGBColor(23, 190, 207),
    RGBColor(158, 218, 229),
];

/// Fill color of the bars on the message-count page.
pub const BAR_COLOR: RGBColor = CATEGORICAL_20[0];

/// Axis, tick and label color.
pub const INK: RGBColor = RGBColor(38, 38, 38);

/// Series color for the participant at `index` in ranking order.
///
/// Wraps around after [`PALETTE_SIZE`] participants, so the 21st participant
/// shares the first participant's color.
pub fn color_for(index: usize) -> RGBColor {
    CATEGORICAL_20[index % PALETTE_SIZE]
}
