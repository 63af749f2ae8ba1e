/// Command reference shown by `help`
pub fn execute() -> String {
    [
        "📖 chartsage commands",
        "",
        "📈 Data",
        "  fetch [SYMBOL] [START] [END]   Load daily prices (dates as YYYY-MM-DD, END exclusive)",
        "  status                         Show the current symbol, range, indicators and last values",
        "",
        "📊 Chart",
        "  indicators                     List the catalog and the current selection",
        "  indicators sma ema:50 bb:20:2  Replace the selection (sma[:N] ema[:N] bb[:N[:K]] vwap)",
        "  indicators add|remove LIST     Change the selection",
        "  indicators clear               Plain candlestick chart",
        "  chart                          Re-render the chart files",
        "",
        "🤖 AI Analysis",
        "  mode [basic|advanced]          Show or set the analysis prompt",
        "  analyze                        Send a chart snapshot to the vision model",
        "",
        "  help, quit",
    ]
    .join("\n")
}
