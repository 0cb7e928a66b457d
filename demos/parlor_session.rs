//! One sitting at every table, printed to the terminal
//!
//! Run with `cargo run --example parlor_session`. Uses an ephemeral
//! wallet so nothing is written to disk.

use parlor::games::poker::PokerRound;
use parlor::games::roulette::{Color, RouletteBet, RouletteTable};
use parlor::games::{BlackjackRound, ThreadRandom};
use parlor::wallet::WalletStore;
use parlor::ParlorConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ParlorConfig::ephemeral();
    let store = WalletStore::new(&config);
    let mut rng = ThreadRandom::new();

    let _sub = store.subscribe(|snapshot| {
        println!("  wallet: {} tokens", snapshot.balance);
    });

    let snapshot = store.snapshot();
    println!(
        "{} sits down with {} tokens",
        snapshot.nickname, snapshot.balance
    );

    // Roulette: 25 on red.
    println!("\n-- roulette --");
    store.debit(25);
    store.record_wager(25);
    let table = RouletteTable::new(config.games.roulette.clone());
    let spin = table
        .spin(&RouletteBet::color(25, Color::Red), &mut rng)
        .expect("valid bet");
    println!("  ball lands on {} ({})", spin.number, spin.color);
    store.credit(spin.settlement.payout);
    store.record_outcome(spin.settlement.outcome.is_win());
    println!("  {}: payout {}", spin.settlement.outcome, spin.settlement.payout);

    // Blackjack: 50 on the box, hit to 17 like the house.
    println!("\n-- blackjack --");
    store.debit(50);
    store.record_wager(50);
    let mut round = BlackjackRound::new(50, config.games.blackjack.clone()).expect("valid bet");
    round.deal(&mut rng).expect("deal");
    while round.settlement().is_none() && round.player_total() < 17 {
        round.hit().expect("hit");
    }
    if round.settlement().is_none() {
        round.stand().expect("stand");
    }
    let settlement = round.settlement().expect("settled").clone();
    println!(
        "  player {} vs dealer {}",
        round.player_total(),
        round.dealer_total()
    );
    store.credit(settlement.payout);
    store.record_outcome(settlement.outcome.is_win());
    println!("  {}: payout {}", settlement.outcome, settlement.payout);

    // Poker: open for the big blind, call everything down.
    println!("\n-- poker --");
    let big_blind = config.games.poker.big_blind;
    store.debit(big_blind);
    let mut round =
        PokerRound::open(big_blind, config.games.poker.clone(), &mut rng).expect("valid bet");
    let settlement = loop {
        let report = if round.to_call() > 0 {
            round.call(&mut rng).expect("call")
        } else {
            round.check(&mut rng).expect("check")
        };
        if report.player_spend > 0 {
            store.debit(report.player_spend);
        }
        if let Some(opponent) = report.opponent {
            println!("  opponent: {:?}", opponent);
        }
        if let Some(settlement) = report.settlement {
            break settlement;
        }
    };
    store.record_wager(settlement.bet_amount);
    store.credit(settlement.payout);
    store.record_outcome(settlement.outcome.is_win());
    println!("  {}: payout {}", settlement.outcome, settlement.payout);

    let snapshot = store.snapshot();
    println!(
        "\n{} leaves with {} tokens ({} wins, {} losses, {} wagered)",
        snapshot.nickname, snapshot.balance, snapshot.wins, snapshot.losses, snapshot.total_wagered
    );
}
