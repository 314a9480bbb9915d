use coastle_engine::models::ScreenPoint;
use coastle_engine::viewport::PanKey;

/// One line of terminal input, mapped onto minimap and round actions.
/// Coordinates are widget-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Click(ScreenPoint),
    Down(ScreenPoint),
    Move(ScreenPoint),
    Up,
    Leave,
    Pinch(ScreenPoint, ScreenPoint),
    PinchMove(ScreenPoint, ScreenPoint),
    Wheel(ScreenPoint, f64),
    ZoomIn,
    ZoomOut,
    Pan(PanKey),
    Recenter,
    Resize(f64, f64),
    Hint,
    Guess,
    Next,
    Reload,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  click X Y            place the pin at widget pixel (X, Y)
  down X Y | move X Y | release | leave
                       drive the pointer by hand (drag to pan)
  pinch X1 Y1 X2 Y2    start a two-finger gesture
  pinchmove X1 Y1 X2 Y2
  wheel X Y DY         scroll at (X, Y); negative DY zooms in
  + | -                zoom the minimap around its centre
  up | down | left | right
                       pan the minimap with the arrow keys
  recenter             reset zoom and pan
  resize W H           change the widget size
  hint                 zoom the satellite image out (costs a turn)
  guess                submit the pin
  next                 next location (infinite mode)
  reload               fetch locations again
  status | help | quit";

fn number(parts: &[&str], i: usize) -> Result<f64, String> {
    let raw = parts
        .get(i)
        .ok_or_else(|| format!("{} needs more arguments", parts[0]))?;
    let v = raw
        .parse::<f64>()
        .map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("{raw:?} is not a finite number"))
    }
}

fn point(parts: &[&str], i: usize) -> Result<ScreenPoint, String> {
    Ok(ScreenPoint::new(number(parts, i)?, number(parts, i + 1)?))
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&name) = parts.first() else {
            return Ok(None);
        };

        let cmd = match name.to_ascii_lowercase().as_str() {
            "click" | "c" => Command::Click(point(&parts, 1)?),
            "down" if parts.len() > 1 => Command::Down(point(&parts, 1)?),
            "move" => Command::Move(point(&parts, 1)?),
            "release" => Command::Up,
            "up" if parts.len() == 1 => Command::Pan(PanKey::Up),
            "leave" => Command::Leave,
            "pinch" => Command::Pinch(point(&parts, 1)?, point(&parts, 3)?),
            "pinchmove" => Command::PinchMove(point(&parts, 1)?, point(&parts, 3)?),
            "wheel" => Command::Wheel(point(&parts, 1)?, number(&parts, 3)?),
            "+" | "=" | "zoomin" => Command::ZoomIn,
            "-" | "_" | "zoomout" => Command::ZoomOut,
            "down" => Command::Pan(PanKey::Down),
            "left" => Command::Pan(PanKey::Left),
            "right" => Command::Pan(PanKey::Right),
            "recenter" | "reset" => Command::Recenter,
            "resize" => Command::Resize(number(&parts, 1)?, number(&parts, 2)?),
            "hint" | "h" => Command::Hint,
            "guess" | "g" => Command::Guess,
            "next" | "n" => Command::Next,
            "reload" => Command::Reload,
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command: {other} (try `help`)")),
        };
        Ok(Some(cmd))
    }
}
