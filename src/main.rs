use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use swatchlab::app::commands::{self, DatavizArgs, EditArgs, PaletteArgs};
use swatchlab::data::config::Config;
use swatchlab::dataviz::ChartType;
use swatchlab::editor::Adjustments;

#[derive(Parser)]
#[command(name = "swatchlab")]
#[command(about = "Dominant colours, food labels and quick plots from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the dominant colour palette of an image
    Palette {
        image: PathBuf,

        /// Longest side scanned after downsampling
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Bits kept per channel when bucketing (1-7)
        #[arg(short, long)]
        bits: Option<u8>,

        /// Minimum share in percent for a colour to be listed
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Store the result in the analysis history
        #[arg(long)]
        save: bool,

        /// Print JSON instead of coloured rows
        #[arg(long)]
        json: bool,
    },
    /// Show saved palette analyses, newest first
    History {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Look up a product by barcode on Open Food Facts
    Food { barcode: String },
    /// E-code additive reference
    Additives {
        #[command(subcommand)]
        action: AdditivesAction,
    },
    /// Apply colour adjustments and transforms to an image
    Edit {
        input: PathBuf,
        output: PathBuf,

        #[arg(long, default_value_t = 1.0)]
        saturation: f32,
        #[arg(long, default_value_t = 1.0)]
        brightness: f32,
        #[arg(long, default_value_t = 1.0)]
        contrast: f32,
        #[arg(long, default_value_t = 1.0)]
        red: f32,
        #[arg(long, default_value_t = 1.0)]
        green: f32,
        #[arg(long, default_value_t = 1.0)]
        blue: f32,
        /// Hue rotation in degrees
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        hue: f32,

        /// Keep this centred fraction of each side (e.g. 0.8)
        #[arg(long)]
        crop: Option<f32>,

        /// Quarter turns only: 90, 180, 270 or negatives
        #[arg(long, allow_negative_numbers = true)]
        rotate: Option<i32>,

        /// Target size as WIDTHxHEIGHT
        #[arg(long)]
        resize: Option<String>,
    },
    /// Plot y = f(x) in the terminal
    Graph {
        expression: String,

        #[arg(long, allow_negative_numbers = true)]
        x_min: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        x_max: Option<f64>,
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Chart a small table (.csv or .toml) as grouped bars or a pie
    Dataviz {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ChartType::Bar)]
        chart: ChartType,

        /// Value column for the pie chart; defaults to the first one
        #[arg(long)]
        column: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdditivesAction {
    /// Find E-codes mentioned in ingredient text
    Detect { text: String },
    /// List known additives
    List {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long)]
        category: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default()?;

    match cli.command {
        Commands::Palette {
            image,
            max_dimension,
            bits,
            threshold,
            save,
            json,
        } => commands::palette(
            &config,
            &PaletteArgs {
                image,
                max_dimension,
                bits,
                threshold,
                save,
                json,
            },
        ),
        Commands::History { limit } => commands::history(&config, limit),
        Commands::Food { barcode } => commands::food(&config, &barcode),
        Commands::Additives { action } => match action {
            AdditivesAction::Detect { text } => commands::additives_detect(&text),
            AdditivesAction::List { query, category } => commands::additives_list(&query, category.as_deref()),
        },
        Commands::Edit {
            input,
            output,
            saturation,
            brightness,
            contrast,
            red,
            green,
            blue,
            hue,
            crop,
            rotate,
            resize,
        } => commands::edit(&EditArgs {
            input,
            output,
            adjustments: Adjustments {
                saturation,
                brightness,
                contrast,
                red,
                green,
                blue,
                hue,
            },
            crop,
            rotate,
            resize,
        }),
        Commands::Graph {
            expression,
            x_min,
            x_max,
            steps,
        } => {
            let g = &mut config.graph;
            g.x_min = x_min.unwrap_or(g.x_min);
            g.x_max = x_max.unwrap_or(g.x_max);
            g.steps = steps.unwrap_or(g.steps);
            commands::graph(&config.graph, &expression)
        }
        Commands::Dataviz { file, chart, column } => commands::dataviz(&config, &DatavizArgs { file, chart, column }),
    }
}
