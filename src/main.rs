//! TESSERA - Interactive MemTable Shell
//! Drives a single in-memory MemTable from stdin for manual inspection.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tessera::config::Config;
use tessera::engine::{ttl, EntryIterator, MemTable};
use tessera::types::Entry;

fn main() {
    env_logger::init();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║            TESSERA MemTable               ║");
    println!("  ║     Arena Skip List + Bloom Filter        ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!();
    println!("  Commands:");
    println!("    set <key> <value>        - Store a key-value pair");
    println!("    setex <key> <secs> <val> - Store a pair that expires");
    println!("    get <key>                - Retrieve a value by key");
    println!("    del <key>                - Delete a key (tombstone)");
    println!("    scan                     - List live key-value pairs");
    println!("    dump                     - List every entry, tombstones included");
    println!("    bloom <key>              - Build the flush filter and probe it");
    println!("    info                     - Show memtable statistics");
    println!("    exit                     - Quit");
    println!();

    let config = Config::new(1024 * 1024).with_arena_grow_step(64 * 1024 * 1024);
    let table = match MemTable::new(config) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("[ERROR] Failed to create memtable: {}", err);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("tessera> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_lowercase().as_str() {
            "set" | "put" => {
                if parts.len() < 3 {
                    println!("  Usage: set <key> <value>");
                    continue;
                }
                let value = parts[2..].join(" ");
                match table.set(&Entry::new(parts[1].to_string(), value)) {
                    Ok(()) => println!("  OK"),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "setex" => {
                let secs = parts.get(2).and_then(|s| s.parse::<u64>().ok());
                match (parts.len() >= 4, secs) {
                    (true, Some(secs)) => {
                        let value = parts[3..].join(" ");
                        let entry = Entry::new(parts[1].to_string(), value)
                            .with_ttl(Duration::from_secs(secs));
                        match table.set(&entry) {
                            Ok(()) => println!("  OK (expires at {})", entry.expires_at),
                            Err(e) => println!("  ERROR: {}", e),
                        }
                    }
                    _ => println!("  Usage: setex <key> <secs> <value>"),
                }
            }
            "get" => {
                if parts.len() < 2 {
                    println!("  Usage: get <key>");
                    continue;
                }
                match table.get_value(parts[1].as_bytes()) {
                    Some(value) => match std::str::from_utf8(&value) {
                        Ok(s) => println!("  \"{}\"", s),
                        Err(_) => println!("  <binary data>"),
                    },
                    None => println!("  (nil)"),
                }
            }
            "del" | "delete" => {
                if parts.len() < 2 {
                    println!("  Usage: del <key>");
                    continue;
                }
                match table.delete(parts[1].to_string()) {
                    Ok(()) => println!("  OK (deleted)"),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "scan" | "list" => {
                let entries = table.scan();
                if entries.is_empty() {
                    println!("  (empty)");
                } else {
                    for e in &entries {
                        let k = String::from_utf8_lossy(&e.key);
                        let v = String::from_utf8_lossy(&e.value);
                        println!("  {} -> {}", k, v);
                    }
                    println!("  ({} entries)", entries.len());
                }
            }
            "dump" => {
                let now = ttl::now_secs();
                for e in table.iter().entries() {
                    let k = String::from_utf8_lossy(&e.key);
                    if e.is_tombstone() {
                        println!("  {} -> <tombstone>", k);
                    } else {
                        let v = String::from_utf8_lossy(&e.value);
                        match ttl::remaining_ttl(e.expires_at, now) {
                            Some(0) => println!("  {} -> {} (expired)", k, v),
                            Some(secs) => println!("  {} -> {} (ttl {}s)", k, v, secs),
                            None => println!("  {} -> {}", k, v),
                        }
                    }
                }
            }
            "bloom" => {
                if parts.len() < 2 {
                    println!("  Usage: bloom <key>");
                    continue;
                }
                let filter = table.build_filter();
                let verdict = if filter.may_contain_key(parts[1].as_bytes()) {
                    "maybe present"
                } else {
                    "definitely absent"
                };
                println!(
                    "  {} ({} bits, k={}, est. fp rate {:.4})",
                    verdict,
                    filter.bit_len(),
                    filter.hash_count(),
                    filter.estimated_fpr(table.len())
                );
            }
            "info" | "stats" => {
                println!("  Keys:          {}", table.len());
                println!("  Arena used:    {} bytes", table.size());
                println!(
                    "  Needs flush:   {} (threshold {} bytes)",
                    table.is_full(),
                    table.config().memtable_max_size
                );
                println!("{}", table.metrics().report());
            }
            "exit" | "quit" | "q" => {
                println!("  Bye.");
                break;
            }
            _ => {
                println!("  Unknown command: '{}'. Type 'exit' to quit.", parts[0]);
            }
        }
    }
}
