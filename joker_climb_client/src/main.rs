mod view;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use joker_climb_core::{CardId, Command, EngineError, GameConfig, GameState, SeatIndex};

#[derive(Parser, Debug)]
#[command(name = "joker_climb")]
#[command(about = "三人爬牌：本地同屏对局")]
struct Args {
    /// 洗牌种子（同一个种子得到同样的发牌）
    #[arg(long)]
    seed: Option<u64>,

    /// 三位玩家的昵称，逗号分隔
    #[arg(long, value_delimiter = ',')]
    names: Option<Vec<String>>,

    /// 发牌后自动理牌
    #[arg(long)]
    auto_sort: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> GameConfig {
        let mut config = GameConfig { auto_sort: self.auto_sort, seed: self.seed, ..GameConfig::default() };
        if let Some(names) = &self.names {
            config.seat_names = names.clone();
        }
        config
    }
}

/// 一行输入解析后的结果
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Engine(Command),
    State,
    Help,
    Reset,
    Exit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config();
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut game = GameState::new(config);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("--- 三人爬牌 ---");
    print_help();
    view::print_table(&game);

    loop {
        print!("{}> ", view::prompt(&game));
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let input = match parse_line(&line, &game) {
            Ok(input) => input,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        let command = match input {
            Input::Engine(command) => command,
            Input::State => {
                println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
                continue;
            }
            Input::Help => {
                print_help();
                continue;
            }
            Input::Reset => {
                // 重置会丢掉当前牌局，先确认
                print!("确定要重置牌局吗？(y/N) ");
                std::io::stdout().flush()?;
                let answer = stdin.next_line().await?.unwrap_or_default();
                if !answer.trim().eq_ignore_ascii_case("y") {
                    println!("已取消");
                    continue;
                }
                Command::Reset
            }
            Input::Exit => {
                println!("再见");
                break;
            }
        };

        debug!(?command, "执行指令");
        match game.handle(command, &mut rng) {
            Ok(events) => {
                for event in &events {
                    view::print_event(&game, event);
                }
                view::print_table(&game);
            }
            Err(e) => println!("！{}", e),
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_help() {
    println!("可用命令:");
    println!("  join <昵称>              - 就座（等待阶段）");
    println!("  leave <座位号>           - 离座（等待阶段）");
    println!("  start                    - 洗牌发牌，开始游戏");
    println!("  play <位置|牌>...        - 出牌，如 play 1 2 或 play 10-hearts joker-high");
    println!("  pass                     - 过牌（无牌可出时）");
    println!("  hint                     - 出牌提示");
    println!("  sort                     - 理牌");
    println!("  move <从> <到>           - 移动一张牌的位置");
    println!("  state                    - 以 JSON 输出当前状态");
    println!("  reset                    - 重置牌局");
    println!("  help                     - 显示本帮助");
    println!("  exit                     - 退出");
}

/// 把一行输入翻译成指令。出牌、过牌等都作用于当前行动的座位。
fn parse_line(line: &str, game: &GameState) -> Result<Input, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&command) = parts.first() else {
        return Err("请输入命令".to_string());
    };
    let args = &parts[1..];

    let input = match command {
        "join" => {
            if args.is_empty() {
                return Err("用法: join <昵称>".to_string());
            }
            Input::Engine(Command::AddSeat { name: args.join(" ") })
        }
        "leave" => {
            let seat = args.first().ok_or("用法: leave <座位号>")?;
            Input::Engine(Command::RemoveSeat { seat: parse_position(seat)? })
        }
        "start" => Input::Engine(Command::StartGame),
        "play" => {
            if args.is_empty() {
                return Err("用法: play <位置|牌>...".to_string());
            }
            let seat = acting_seat(game)?;
            let cards = args
                .iter()
                .map(|arg| parse_card(arg, game, seat))
                .collect::<Result<Vec<_>, _>>()?;
            Input::Engine(Command::Play { seat, cards })
        }
        "pass" => Input::Engine(Command::Skip { seat: acting_seat(game)? }),
        "hint" => Input::Engine(Command::Hint { seat: acting_seat(game)? }),
        "sort" => Input::Engine(Command::SortHand { seat: acting_seat(game)? }),
        "move" => {
            let [from, to] = args else {
                return Err("用法: move <从> <到>".to_string());
            };
            Input::Engine(Command::MoveCard {
                seat: acting_seat(game)?,
                from: parse_position(from)?,
                to: parse_position(to)?,
            })
        }
        "state" => Input::State,
        "help" => Input::Help,
        "reset" => Input::Reset,
        "exit" | "quit" => Input::Exit,
        _ => return Err(format!("未知命令: {}", line.trim())),
    };
    Ok(input)
}

fn acting_seat(game: &GameState) -> Result<SeatIndex, String> {
    game.current_seat().ok_or_else(|| "现在没有人需要行动".to_string())
}

/// 界面上的编号从 1 开始
fn parse_position(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("无效的编号: {}", arg)),
    }
}

/// 数字是手牌中的位置，否则按牌的编号解析（如 10-hearts）
fn parse_card(arg: &str, game: &GameState, seat: SeatIndex) -> Result<CardId, String> {
    if arg.chars().all(|c| c.is_ascii_digit()) {
        let pos = parse_position(arg)?;
        let hand = game.hand(seat).map_err(|e| e.to_string())?;
        return hand
            .get(pos)
            .map(|c| c.id())
            .ok_or_else(|| format!("手牌中没有第 {} 张", arg));
    }
    arg.parse::<CardId>().map_err(|e: EngineError| e.to_string())
}
