//! CLI argument definition and parsing.

use std::env;
use std::net::IpAddr;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use httpdig::{ResolverConfig, DEFAULT_EDNS_SUBNET, DEFAULT_ENDPOINT};
use httpdig_proto::RecordType;
use owo_colors::OwoColorize;

#[derive(Clone, Debug)]
pub struct Args {
    pub endpoint: String,
    pub name: String,
    /// Sent to the resolver as is: a mnemonic like `AAAA`, or a number for types without one.
    pub qtype: String,
    pub verbose: bool,
    pub json: bool,
    pub print_meta: bool,
    pub pad_answers: bool,
    pub edns_subnet: String,
    pub timeout: Duration,
}

enum ConsumeNext {
    Subnet,
    Timeout,
}

const DEFAULT_NAME: &str = "example.com";
const DEFAULT_QTYPE: RecordType = RecordType::A;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

impl Args {
    pub fn parse() -> Self {
        // skip executable name
        match Self::parse_from(env::args().skip(1)) {
            Ok(args) => args,
            Err(msg) => err(msg),
        }
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut endpoint = DEFAULT_ENDPOINT.to_string();
        let mut name = DEFAULT_NAME.to_string();
        let mut qtype = DEFAULT_QTYPE.to_string();
        let mut verbose = false;
        let mut json = false;
        let mut print_meta = true;
        let mut pad_answers = true;
        let mut edns_subnet = DEFAULT_EDNS_SUBNET.to_string();
        let mut timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

        let mut reverse = false;
        let mut consume_next = None;

        for arg in args {
            if let Some(to_consume) = consume_next.take() {
                match to_consume {
                    ConsumeNext::Subnet => edns_subnet = arg,
                    ConsumeNext::Timeout => match arg.parse::<u64>() {
                        Ok(secs) if secs > 0 => timeout = Duration::from_secs(secs),
                        _ => return Err(format!("Invalid timeout: {}.", arg)),
                    },
                }
            } else if let Some(ep) = arg.strip_prefix('@') {
                endpoint = endpoint_url(ep);
            } else if let Some(flag) = arg.strip_prefix('+') {
                match flag {
                    "verbose" => verbose = true,
                    "json" => json = true,
                    "no-meta" => print_meta = false,
                    "no-padding" => pad_answers = false,
                    "no-subnet" => edns_subnet.clear(),
                    x => return Err(format!("Invalid flag: +{}.", x)),
                }
            } else if let Some(option) = arg.strip_prefix('-') {
                match option {
                    "h" | "-help" => {
                        print_help();
                        process::exit(0);
                    }
                    "V" | "-version" => {
                        print_version();
                        process::exit(0);
                    }
                    "s" | "-subnet" => consume_next = Some(ConsumeNext::Subnet),
                    "t" | "-timeout" => consume_next = Some(ConsumeNext::Timeout),
                    "x" => reverse = true,
                    x => return Err(format!("Invalid option: -{}.", x)),
                }
            } else if let Some(t) = parse_qtype(&arg) {
                qtype = t;
            } else {
                // use name as fallback
                name = arg;
            }
        }

        match consume_next {
            Some(ConsumeNext::Subnet) => return Err("Missing value for --subnet.".into()),
            Some(ConsumeNext::Timeout) => return Err("Missing value for --timeout.".into()),
            None => (),
        }

        if verbose && !pad_answers {
            return Err("Cannot use both +verbose and +no-padding.".into());
        }

        if reverse {
            name = match IpAddr::from_str(&name) {
                Ok(ip) => reverse_name(ip),
                Err(_) => {
                    return Err(format!(
                        "Expected IP address for reverse lookup, but got: {}.",
                        name
                    ))
                }
            };
            qtype = RecordType::PTR.to_string();
        }

        Ok(Self {
            endpoint,
            name,
            qtype,
            verbose,
            json,
            print_meta,
            pad_answers,
            edns_subnet,
            timeout,
        })
    }
}

impl From<Args> for ResolverConfig {
    fn from(args: Args) -> Self {
        Self {
            endpoint: args.endpoint,
            edns_subnet: args.edns_subnet,
            timeout: args.timeout,
        }
    }
}

/// Accepts a full URL, or a bare hostname that is assumed to serve the API at `/resolve`.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}/resolve", endpoint)
    }
}

/// Recognizes record type mnemonics (case-insensitive) and the generic `TYPE<n>` syntax.
fn parse_qtype(arg: &str) -> Option<String> {
    let upper = arg.to_uppercase();
    if let Ok(t) = RecordType::from_str(&upper) {
        if !matches!(t, RecordType::Unknown(_)) {
            return Some(t.to_string());
        }
    }
    upper
        .strip_prefix("TYPE")
        .and_then(|n| n.parse::<u16>().ok())
        .map(|n| n.to_string())
}

fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(addr) => {
            let octets = addr.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(addr) => {
            let mut name = String::with_capacity(72);
            for s in addr.segments().iter().rev() {
                for c in format!("{:04x}", s).chars().rev() {
                    name.push(c);
                    name.push('.');
                }
            }
            name.push_str("ip6.arpa");
            name
        }
    }
}

macro_rules! var {
    ($var:expr) => {
        $var.if_supports_color(owo_colors::Stream::Stdout, |s| s.green())
    };
}

macro_rules! printopt {
    ($opt:expr, $desc:expr) => {
        println!(
            "\t    {:<24} ({})",
            $opt.if_supports_color(owo_colors::Stream::Stdout, |s| s.yellow()),
            $desc,
        )
    };
}

macro_rules! printflag {
    ($flag:expr, $desc:expr) => {
        println!(
            "\t    {:<12} ({})",
            $flag.if_supports_color(owo_colors::Stream::Stdout, |s| s.yellow()),
            $desc,
        )
    };
}

fn print_help() {
    let output = owo_colors::Stream::Stdout;
    print!("{}", "Usage:".if_supports_color(output, |s| s.purple()));
    println!(
        "\thttpdig [@{}] [{}] [{}] [{}] [{}]",
        var!("endpoint"),
        var!("domain"),
        var!("q-type"),
        var!("options"),
        var!("flags")
    );
    println!();

    println!("{}", "Where:".if_supports_color(output, |s| s.purple()));

    println!(
        "\t{} is the URL or hostname of a DNS-over-HTTPS JSON resolver",
        var!("endpoint")
    );
    println!();

    println!("\t{} is the domain you want to query", var!("domain"));
    println!();

    println!(
        "\t{} is the record type you want (e.g. AAAA, A, TXT, MX, SOA, TYPE65, ...)",
        var!("q-type")
    );
    println!();

    println!("\t{} is one or more of the following:", var!("options"));
    printopt!("-h | --help", "print this help message");
    printopt!("-V | --version", "print the version of httpdig");
    printopt!("-s | --subnet <cidr>", "send the given EDNS client subnet");
    printopt!("-t | --timeout <secs>", "give up after the given number of seconds");
    printopt!("-x", "shortcut for reverse lookup");
    println!();
    println!("\t{} is one or more of the following:", var!("flags"));
    printflag!(
        "+verbose",
        "print all sections, i.e. header, question and comment"
    );
    printflag!("+json", "format output as JSON; may be used with +verbose");
    printflag!(
        "+no-meta",
        "don't print query metadata, e.g. server and time"
    );
    printflag!(
        "+no-padding",
        "don't pad output; cannot be used with +verbose"
    );
    printflag!(
        "+no-subnet",
        "let the resolver see your network; same as -s \"\""
    );
    println!();

    println!("Note: the order of the arguments does not matter.");
    println!();

    println!(
        "If no arguments are specified, the default behaviour is\n`{}`.",
        format!(
            "httpdig @{} {} {} -s {}",
            DEFAULT_ENDPOINT, DEFAULT_NAME, DEFAULT_QTYPE, DEFAULT_EDNS_SUBNET
        )
        .if_supports_color(output, |s| s.green())
    );
    println!();

    println!(
        "Output is colourized by default. This can be tuned using the {}/\n{} environment variables.",
        var!("FORCE_COLOR"),
        var!("NO_COLOR")
    );
    println!(
        "Diagnostics are logged to stderr; set {} (e.g. `debug`) to see more.",
        var!("RUST_LOG")
    );
}

fn print_version() {
    println!("httpdig v{}", env!("CARGO_PKG_VERSION"));
}

fn err(msg: impl AsRef<str>) -> ! {
    eprintln!("{}", msg.as_ref());
    process::exit(1)
}
