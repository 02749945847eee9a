use anyhow::{Context, Result};
use cellgrid_engine::device::GpuInit;
use cellgrid_engine::grid::GridConfig;
use cellgrid_engine::logging::{init_logging, LoggingConfig};
use cellgrid_engine::render::FrameRenderer;
use cellgrid_engine::window::{Runtime, RuntimeConfig};
use cellgrid_engine::GridError;

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run() {
        match err.downcast_ref::<GridError>() {
            Some(grid_err) => eprintln!("error [{}]: {err:#}", grid_err.kind()),
            None => eprintln!("error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let grid = match std::env::args().nth(1) {
        Some(arg) => parse_grid(&arg).with_context(|| format!("invalid grid argument {arg:?}"))?,
        None => GridConfig::default(),
    };

    Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        grid,
        FrameRenderer::default(),
    )
}

/// Accepts `N` (square) or `WxH`.
fn parse_grid(arg: &str) -> Result<GridConfig> {
    let (w, h) = match arg.split_once(['x', 'X']) {
        Some((w, h)) => (w.trim().parse::<u32>()?, h.trim().parse::<u32>()?),
        None => {
            let n = arg.trim().parse::<u32>()?;
            (n, n)
        }
    };
    Ok(GridConfig::new(w, h)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_argument() {
        let g = parse_grid("32").unwrap();
        assert_eq!((g.width(), g.height()), (32, 32));
    }

    #[test]
    fn rectangular_argument() {
        let g = parse_grid("8x4").unwrap();
        assert_eq!((g.width(), g.height()), (8, 4));
    }

    #[test]
    fn zero_dimension_is_grid_error() {
        let err = parse_grid("0x4").unwrap_err();
        assert!(err.downcast_ref::<GridError>().is_some());
    }

    #[test]
    fn overflowing_grid_is_grid_error() {
        let err = parse_grid("65536x65536").unwrap_err();
        let kind = err.downcast_ref::<GridError>().map(GridError::kind);
        assert_eq!(kind, Some("InvalidGridSizeError"));
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse_grid("big").is_err());
    }
}
